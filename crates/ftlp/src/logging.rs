//! Structured logging setup.

use std::env;
use std::fs::{File, OpenOptions};
use std::io;

use ftlp_highs::highs_version;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Errors raised while installing the tracing subscriber.
#[derive(Debug)]
pub enum LoggingError {
    InvalidFilter(String),
    InvalidFormat(String),
    LogFile { path: String, source: io::Error },
    Init(String),
}

impl LoggingError {
    pub fn code(&self) -> &'static str {
        match self {
            LoggingError::InvalidFilter(_) => "LOG_INVALID_FILTER",
            LoggingError::InvalidFormat(_) => "LOG_INVALID_FORMAT",
            LoggingError::LogFile { .. } => "LOG_FILE_UNAVAILABLE",
            LoggingError::Init(_) => "LOG_INIT_FAILED",
        }
    }
}

impl std::fmt::Display for LoggingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoggingError::InvalidFilter(err) => {
                write!(f, "[{}] Invalid log filter: {}", self.code(), err)
            }
            LoggingError::InvalidFormat(format) => write!(
                f,
                "[{}] Invalid FTLP_LOG_FORMAT '{}' (expected 'json' or 'pretty')",
                self.code(),
                format
            ),
            LoggingError::LogFile { path, source } => write!(
                f,
                "[{}] Failed to open log file {}: {}",
                self.code(),
                path,
                source
            ),
            LoggingError::Init(err) => {
                write!(f, "[{}] Failed to initialize logging: {}", self.code(), err)
            }
        }
    }
}

impl std::error::Error for LoggingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoggingError::LogFile { source, .. } => Some(source),
            _ => None,
        }
    }
}

fn open_log_file(path: &str) -> Result<File, LoggingError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LoggingError::LogFile {
            path: path.to_string(),
            source,
        })
}

fn map_init_err<E: std::fmt::Display>(err: E) -> LoggingError {
    LoggingError::Init(err.to_string())
}

fn build_filter(level: &str) -> Result<EnvFilter, LoggingError> {
    if level.eq_ignore_ascii_case("off") {
        Ok(EnvFilter::default().add_directive(LevelFilter::OFF.into()))
    } else {
        EnvFilter::try_new(level).map_err(|err| LoggingError::InvalidFilter(err.to_string()))
    }
}

/// Whether `format` selects JSON output.
fn parse_format(format: &str) -> Result<bool, LoggingError> {
    if format.eq_ignore_ascii_case("json") {
        Ok(true)
    } else if format.eq_ignore_ascii_case("pretty") {
        Ok(false)
    } else {
        Err(LoggingError::InvalidFormat(format.to_string()))
    }
}

/// Install a global tracing subscriber.
///
/// When `level` is `None` this reads `FTLP_TRACE`, defaulting to `off`.
/// `FTLP_LOG_FORMAT` picks `pretty` (default) or `json` output on stderr and
/// `FTLP_LOG_FILE` additionally appends to a file. Returns `Ok(false)` if a
/// subscriber is already installed.
pub fn enable_logging(level: Option<&str>) -> Result<bool, LoggingError> {
    if tracing::dispatcher::has_been_set() {
        return Ok(false);
    }

    let level_value = level
        .map(str::to_string)
        .or_else(|| env::var("FTLP_TRACE").ok())
        .unwrap_or_else(|| "off".to_string());
    let filter = build_filter(&level_value)?;

    let format = env::var("FTLP_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());
    let use_json = parse_format(&format)?;
    let log_file = env::var("FTLP_LOG_FILE").ok();

    if use_json {
        let stderr_layer = tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .json();
        let base = tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer);
        if let Some(path) = log_file {
            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(open_log_file(&path)?)
                .with_ansi(false)
                .json();
            base.with(file_layer).try_init().map_err(map_init_err)?;
        } else {
            base.try_init().map_err(map_init_err)?;
        }
    } else {
        let stderr_layer = tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .pretty();
        let base = tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer);
        if let Some(path) = log_file {
            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(open_log_file(&path)?)
                .with_ansi(false)
                .pretty();
            base.with(file_layer).try_init().map_err(map_init_err)?;
        } else {
            base.try_init().map_err(map_init_err)?;
        }
    }

    tracing::debug!(
        component = "logging",
        operation = "enable",
        status = "success",
        level = %level_value,
        json = use_json,
        solver_version = ?highs_version(),
        "Logging enabled"
    );
    Ok(true)
}

/// Solver name and version for diagnostics.
pub fn solver_info() -> (&'static str, Option<String>) {
    ("HiGHS", highs_version())
}
