//! Solve session: one model plus its build -> solve -> read lifecycle.
//!
//! ```text
//! Building --solve()--> Solving --+--> Solved   (optimal, infeasible, unbounded, time limit)
//!                                 +--> Failed   (solver error)
//! any state --dispose()--> Disposed
//! ```
//!
//! The model is frozen as soon as `solve()` starts, whatever its outcome.
//! Results are only readable in `Solved`.

use std::sync::Arc;
use std::time::Instant;

use ftlp_solver::{Solution, SolverConfig, SolverStatus};

use crate::error::ErrorKind;
use crate::model::{CsrBatch, Model, ModelError};
use crate::row_cache::SparseRowCache;
use crate::solver::Backend;
use crate::types::ColumnIndex;

/// Lifecycle state of a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Building,
    Solving,
    Solved,
    Failed,
    Disposed,
}

impl SessionState {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionState::Building => "building",
            SessionState::Solving => "solving",
            SessionState::Solved => "solved",
            SessionState::Failed => "failed",
            SessionState::Disposed => "disposed",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by [`Session`] operations.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    /// The model rejected the arguments; the model is unchanged.
    Model(ModelError),
    /// The operation is not allowed in the current state.
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },
    /// The session was disposed.
    UseAfterDispose { operation: &'static str },
    /// Negative or NaN time limit.
    InvalidTimeLimit { seconds: f64 },
}

impl SessionError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            SessionError::Model(err) => err.code(),
            SessionError::InvalidState { .. } => "SESSION_INVALID_STATE",
            SessionError::UseAfterDispose { .. } => "SESSION_DISPOSED",
            SessionError::InvalidTimeLimit { .. } => "SESSION_INVALID_TIME_LIMIT",
        }
    }

    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::Model(err) => err.kind(),
            SessionError::InvalidState { .. } => ErrorKind::InvalidState,
            SessionError::UseAfterDispose { .. } => ErrorKind::UseAfterDispose,
            SessionError::InvalidTimeLimit { .. } => ErrorKind::InvalidArgument,
        }
    }
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::Model(err) => write!(f, "{err}"),
            SessionError::InvalidState { operation, state } => write!(
                f,
                "[{}] Cannot {} while session is {}",
                self.code(),
                operation,
                state
            ),
            SessionError::UseAfterDispose { operation } => write!(
                f,
                "[{}] Cannot {} after the session was disposed",
                self.code(),
                operation
            ),
            SessionError::InvalidTimeLimit { seconds } => write!(
                f,
                "[{}] Time limit must be non-negative (got {})",
                self.code(),
                seconds
            ),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Model(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ModelError> for SessionError {
    fn from(err: ModelError) -> Self {
        SessionError::Model(err)
    }
}

/// One model and its solve lifecycle.
#[derive(Debug)]
pub struct Session<B: Backend> {
    state: SessionState,
    model: Option<Model>,
    cache: Arc<SparseRowCache>,
    backend: B,
    config: SolverConfig,
    solution: Option<Solution>,
    infinity: f64,
}

impl<B: Backend> Session<B> {
    /// Create a session around an empty model with `num_columns` columns.
    ///
    /// Cached rows go through `cache`, which is usually shared by every
    /// session of a registry.
    pub fn new(
        num_columns: usize,
        row_hint: usize,
        backend: B,
        cache: Arc<SparseRowCache>,
    ) -> Result<Self, SessionError> {
        let model = Model::new(num_columns, row_hint)?;
        let infinity = backend.infinity();
        Ok(Self {
            state: SessionState::Building,
            model: Some(model),
            cache,
            backend,
            config: SolverConfig::default(),
            solution: None,
            infinity,
        })
    }

    /// Replace the initial solver configuration.
    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The backend's unbounded sentinel. Valid in any non-disposed state.
    pub fn infinity(&self) -> Result<f64, SessionError> {
        self.require_live("get infinity")?;
        Ok(self.infinity)
    }

    /// The model buffer. Frozen once `solve()` has started.
    pub fn model(&self) -> Result<&Model, SessionError> {
        self.require_live("read model")?;
        self.model.as_ref().ok_or(SessionError::UseAfterDispose {
            operation: "read model",
        })
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<SparseRowCache> {
        &self.cache
    }

    /// Replace the solver configuration. Valid only while building.
    pub fn set_config(&mut self, config: SolverConfig) -> Result<(), SessionError> {
        self.require_building("set config")?;
        self.config = config;
        Ok(())
    }

    /// Set the wall-clock limit in seconds; `+inf` means unlimited.
    pub fn set_time_limit(&mut self, seconds: f64) -> Result<(), SessionError> {
        self.require_building("set time limit")?;
        if seconds.is_nan() || seconds < 0.0 {
            tracing::warn!(
                component = "session",
                operation = "set_time_limit",
                status = "error",
                seconds,
                "Rejected time limit"
            );
            return Err(SessionError::InvalidTimeLimit { seconds });
        }
        let config = std::mem::take(&mut self.config);
        self.config = if seconds.is_infinite() {
            config.without_time_limit()
        } else {
            config.with_time_limit(seconds)
        };
        tracing::debug!(
            component = "session",
            operation = "set_time_limit",
            status = "success",
            seconds,
            "Set time limit"
        );
        Ok(())
    }

    pub fn set_objective(&mut self, coefficients: &[f64]) -> Result<(), SessionError> {
        Ok(self.model_mut("set objective")?.set_objective(coefficients)?)
    }

    pub fn set_column_bounds(&mut self, lower: &[f64], upper: &[f64]) -> Result<(), SessionError> {
        Ok(self
            .model_mut("set column bounds")?
            .set_column_bounds(lower, upper)?)
    }

    pub fn set_column_start(&mut self, values: &[f64]) -> Result<(), SessionError> {
        Ok(self.model_mut("set column start")?.set_column_start(values)?)
    }

    pub fn set_column_integrality(&mut self, is_integer: &[bool]) -> Result<(), SessionError> {
        Ok(self
            .model_mut("set column integrality")?
            .set_column_integrality(is_integer)?)
    }

    pub fn add_dense_row(
        &mut self,
        coefficients: &[f64],
        lower: f64,
        upper: f64,
    ) -> Result<usize, SessionError> {
        Ok(self
            .model_mut("add dense row")?
            .add_dense_row(coefficients, lower, upper)?)
    }

    pub fn add_sparse_row<I: ColumnIndex>(
        &mut self,
        coefficients: &[f64],
        indices: &[I],
        lower: f64,
        upper: f64,
    ) -> Result<usize, SessionError> {
        Ok(self
            .model_mut("add sparse row")?
            .add_sparse_row(coefficients, indices, lower, upper)?)
    }

    pub fn add_sparse_row_cached<I: ColumnIndex>(
        &mut self,
        coefficients: &[f64],
        indices: &[I],
        lower: f64,
        upper: f64,
    ) -> Result<usize, SessionError> {
        const OPERATION: &str = "add cached sparse row";
        self.require_building(OPERATION)?;
        let Self { model, cache, .. } = self;
        let model = model.as_mut().ok_or(SessionError::UseAfterDispose {
            operation: OPERATION,
        })?;
        Ok(model.add_sparse_row_cached(cache, coefficients, indices, lower, upper)?)
    }

    pub fn add_sparse_rows<I: ColumnIndex>(
        &mut self,
        row_count: usize,
        batch: CsrBatch<'_, I>,
    ) -> Result<std::ops::Range<usize>, SessionError> {
        Ok(self
            .model_mut("add sparse rows")?
            .add_sparse_rows(row_count, batch)?)
    }

    /// Freeze the model, run the backend and store its outcome.
    ///
    /// Solver outcomes (including errors reported by the backend) are returned
    /// as a status, not as `Err`. `Err` is reserved for lifecycle misuse.
    pub fn solve(&mut self) -> Result<SolverStatus, SessionError> {
        self.require_building("solve")?;
        let Some(model) = self.model.as_ref() else {
            return Err(SessionError::UseAfterDispose { operation: "solve" });
        };
        self.state = SessionState::Solving;

        let num_columns = model.num_columns();
        tracing::debug!(
            component = "session",
            operation = "solve",
            status = "start",
            backend = self.backend.name(),
            num_columns,
            num_rows = model.num_rows(),
            num_nonzeros = model.num_nonzeros(),
            time_limit = ?self.config.time_limit,
            "Starting solve"
        );
        let started = Instant::now();
        let outcome = self.backend.solve(model, &self.config);
        let elapsed = started.elapsed().as_secs_f64();

        let solution = match outcome {
            Ok(mut solution) => {
                solution.column_values.resize(num_columns, 0.0);
                solution
            }
            Err(err) => {
                tracing::warn!(
                    component = "session",
                    operation = "solve",
                    status = "error",
                    code = err.code(),
                    "Backend failed: {err}"
                );
                Solution::zeroed(SolverStatus::Error, num_columns).with_solve_time(elapsed)
            }
        };

        let status = solution.status;
        self.state = if status.is_error() {
            SessionState::Failed
        } else {
            SessionState::Solved
        };
        if status.is_optimal() {
            tracing::debug!(
                component = "session",
                operation = "solve",
                status = "success",
                solver_status = %status,
                objective = solution.objective_value,
                elapsed_seconds = elapsed,
                "Solve finished"
            );
        } else {
            tracing::warn!(
                component = "session",
                operation = "solve",
                status = "non_optimal",
                solver_status = %status,
                elapsed_seconds = elapsed,
                "Solve finished without an optimal solution"
            );
        }
        self.solution = Some(solution);
        Ok(status)
    }

    /// Status of the finished solve, if any.
    pub fn status(&self) -> Option<SolverStatus> {
        self.solution.as_ref().map(|solution| solution.status)
    }

    /// Full solution record. Valid only in `Solved`.
    pub fn solution(&self) -> Result<&Solution, SessionError> {
        self.require_solved("read solution")
    }

    /// Column values, one per model column. Valid only in `Solved`.
    pub fn column_solution(&self) -> Result<&[f64], SessionError> {
        Ok(&self.require_solved("get column solution")?.column_values)
    }

    /// Achieved objective value (maximization sense). Valid only in `Solved`.
    pub fn score(&self) -> Result<f64, SessionError> {
        Ok(self.require_solved("get score")?.objective_value)
    }

    /// Release the model and results.
    ///
    /// Returns `false` if the session was already disposed; calling it again is
    /// harmless.
    pub fn dispose(&mut self) -> bool {
        if self.state == SessionState::Disposed {
            return false;
        }
        let previous = self.state;
        self.state = SessionState::Disposed;
        self.model = None;
        self.solution = None;
        tracing::debug!(
            component = "session",
            operation = "dispose",
            status = "success",
            previous_state = %previous,
            "Disposed session"
        );
        true
    }

    fn require_live(&self, operation: &'static str) -> Result<(), SessionError> {
        if self.state == SessionState::Disposed {
            Err(SessionError::UseAfterDispose { operation })
        } else {
            Ok(())
        }
    }

    fn require_building(&self, operation: &'static str) -> Result<(), SessionError> {
        match self.state {
            SessionState::Building => Ok(()),
            SessionState::Disposed => Err(SessionError::UseAfterDispose { operation }),
            state => Err(SessionError::InvalidState { operation, state }),
        }
    }

    fn require_solved(&self, operation: &'static str) -> Result<&Solution, SessionError> {
        match (self.state, self.solution.as_ref()) {
            (SessionState::Solved, Some(solution)) => Ok(solution),
            (SessionState::Disposed, _) => Err(SessionError::UseAfterDispose { operation }),
            (state, _) => Err(SessionError::InvalidState { operation, state }),
        }
    }

    fn model_mut(&mut self, operation: &'static str) -> Result<&mut Model, SessionError> {
        self.require_building(operation)?;
        self.model
            .as_mut()
            .ok_or(SessionError::UseAfterDispose { operation })
    }
}
