//! Resident set size snapshots for the current process.

use std::time::Instant;
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

/// Process RSS at a named stage.
#[derive(Debug, Clone)]
pub struct MemorySnapshot {
    /// Resident set size in bytes
    pub rss_bytes: u64,
    /// When the snapshot was taken
    pub timestamp: Instant,
    /// Stage label, e.g. "solve_start"
    pub stage: String,
}

/// Errors produced by memory instrumentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    ProcessNotFound { pid: u32 },
}

impl MemoryError {
    pub fn code(&self) -> &'static str {
        match self {
            MemoryError::ProcessNotFound { .. } => "MEMORY_PROCESS_NOT_FOUND",
        }
    }
}

impl std::fmt::Display for MemoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MemoryError::ProcessNotFound { pid } => {
                write!(f, "[{}] Failed to locate process {}", self.code(), pid)
            }
        }
    }
}

impl std::error::Error for MemoryError {}

fn read_rss(system: &mut System, pid: Pid) -> Result<u64, MemoryError> {
    system.refresh_processes_specifics(
        ProcessesToUpdate::Some(&[pid]),
        true,
        ProcessRefreshKind::nothing().with_memory(),
    );
    system
        .process(pid)
        .map(|process| process.memory())
        .ok_or(MemoryError::ProcessNotFound {
            pid: std::process::id(),
        })
}

fn current_pid() -> Pid {
    Pid::from(std::process::id() as usize)
}

impl MemorySnapshot {
    /// Capture the current RSS under `stage`.
    ///
    /// # Errors
    ///
    /// Returns an error if the current process cannot be located.
    pub fn capture(stage: &str) -> Result<Self, MemoryError> {
        let mut system = System::new();
        let rss_bytes = read_rss(&mut system, current_pid())?;
        Ok(Self {
            rss_bytes,
            timestamp: Instant::now(),
            stage: stage.to_string(),
        })
    }

    /// RSS growth from `earlier` to `self` in bytes (negative means shrink).
    pub fn diff(&self, earlier: &Self) -> i64 {
        self.rss_bytes as i64 - earlier.rss_bytes as i64
    }

    /// Seconds between `earlier` and `self`.
    pub fn seconds_since(&self, earlier: &Self) -> f64 {
        self.timestamp
            .saturating_duration_since(earlier.timestamp)
            .as_secs_f64()
    }
}

/// RSS growth between two optional readings.
pub fn rss_delta(before: Option<u64>, after: Option<u64>) -> Option<i64> {
    match (before, after) {
        (Some(before), Some(after)) => Some(after as i64 - before as i64),
        _ => None,
    }
}

/// Records snapshots across the stages of a run.
///
/// Keeps one `System` handle alive so repeated captures only refresh this
/// process.
#[derive(Debug)]
pub struct MemoryProbe {
    system: System,
    pid: Pid,
    snapshots: Vec<MemorySnapshot>,
}

impl MemoryProbe {
    pub fn new() -> Self {
        Self {
            system: System::new(),
            pid: current_pid(),
            snapshots: Vec::new(),
        }
    }

    /// Record a snapshot for `stage`.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot could not be captured.
    pub fn record(&mut self, stage: &str) -> Result<&MemorySnapshot, MemoryError> {
        let rss_bytes = read_rss(&mut self.system, self.pid)?;
        self.snapshots.push(MemorySnapshot {
            rss_bytes,
            timestamp: Instant::now(),
            stage: stage.to_string(),
        });
        let last = self.snapshots.len() - 1;
        Ok(&self.snapshots[last])
    }

    pub fn snapshots(&self) -> &[MemorySnapshot] {
        &self.snapshots
    }

    /// Growth between the last two snapshots.
    pub fn last_diff(&self) -> Option<i64> {
        match self.snapshots.as_slice() {
            [.., previous, last] => Some(last.diff(previous)),
            _ => None,
        }
    }

    /// Growth from the first to the last snapshot.
    pub fn total_diff(&self) -> Option<i64> {
        match self.snapshots.as_slice() {
            [first, .., last] => Some(last.diff(first)),
            _ => None,
        }
    }

    /// Largest RSS seen.
    pub fn peak_rss(&self) -> Option<u64> {
        self.snapshots.iter().map(|snapshot| snapshot.rss_bytes).max()
    }
}

impl Default for MemoryProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(stage: &str, rss_bytes: u64) -> MemorySnapshot {
        MemorySnapshot {
            rss_bytes,
            timestamp: Instant::now(),
            stage: stage.to_string(),
        }
    }

    #[test]
    fn test_capture_reads_this_process() {
        let snapshot = MemorySnapshot::capture("solve_start").unwrap_or_else(|err| panic!("{err}"));
        assert_eq!(snapshot.stage, "solve_start");
        assert!(snapshot.rss_bytes > 0);
    }

    #[test]
    fn test_diff_is_signed() {
        let before = snapshot("before", 1_000);
        let after = snapshot("after", 1_500);
        assert_eq!(after.diff(&before), 500);
        assert_eq!(before.diff(&after), -500);
        assert!(after.seconds_since(&before) >= 0.0);
    }

    #[test]
    fn test_rss_delta_needs_both_readings() {
        assert_eq!(rss_delta(Some(10), Some(4)), Some(-6));
        assert_eq!(rss_delta(None, Some(4)), None);
        assert_eq!(rss_delta(Some(10), None), None);
    }

    #[test]
    fn test_probe_tracks_stages() {
        let mut probe = MemoryProbe::new();
        assert_eq!(probe.last_diff(), None);
        probe.record("build").unwrap_or_else(|err| panic!("{err}"));
        assert_eq!(probe.total_diff(), None);
        probe.record("solve").unwrap_or_else(|err| panic!("{err}"));

        let stages: Vec<&str> = probe.snapshots().iter().map(|s| s.stage.as_str()).collect();
        assert_eq!(stages, ["build", "solve"]);
        assert!(probe.last_diff().is_some());
        assert_eq!(probe.last_diff(), probe.total_diff());
        assert!(probe.peak_rss().unwrap_or_default() > 0);
    }
}
