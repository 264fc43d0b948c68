//! Flat handle-based capability surface.
//!
//! Every function resolves its handle through one process-wide
//! [`SessionRegistry`] backed by HiGHS. Inputs are borrowed slices, outputs are
//! owned copies, and integer parameters use `i32`.

use std::sync::OnceLock;

use ftlp_core::{CacheStats, CsrBatch, ModelError};
use ftlp_highs::{HighsBackend, highs_infinity};
use ftlp_solver::SolverConfig;

use crate::error::ApiError;
use crate::registry::{Handle, SessionRegistry};

static REGISTRY: OnceLock<SessionRegistry<HighsBackend>> = OnceLock::new();

/// The process-wide registry behind this module.
pub fn registry() -> &'static SessionRegistry<HighsBackend> {
    REGISTRY.get_or_init(|| SessionRegistry::new(HighsBackend::new()))
}

/// The solver's unbounded sentinel; bounds at or beyond it are unbounded.
pub fn infinity() -> f64 {
    highs_infinity()
}

/// Create a model with `num_columns` columns; `num_rows` is a capacity hint.
pub fn construct_model(num_columns: i32, num_rows: i32) -> Result<Handle, ApiError> {
    registry().create(num_columns, num_rows)
}

/// Release the session behind `handle`.
///
/// Disposing an already disposed handle is a no-op that returns `Ok(false)`.
pub fn dispose_model(handle: Handle) -> Result<bool, ApiError> {
    registry().dispose(handle)
}

pub fn get_infinity(handle: Handle) -> Result<f64, ApiError> {
    registry().with_session(handle, "get infinity", |session| session.infinity())
}

pub fn set_objective(handle: Handle, coefficients: &[f64]) -> Result<(), ApiError> {
    registry().with_session(handle, "set objective", |session| {
        session.set_objective(coefficients)
    })
}

/// Set the solve wall-clock limit in seconds; `f64::INFINITY` removes it.
pub fn set_time_limit(handle: Handle, seconds: f64) -> Result<(), ApiError> {
    registry().with_session(handle, "set time limit", |session| {
        session.set_time_limit(seconds)
    })
}

/// Replace every solver option of one session.
pub fn set_solver_config(handle: Handle, config: SolverConfig) -> Result<(), ApiError> {
    registry().with_session(handle, "set config", |session| session.set_config(config))
}

pub fn set_column_bounds(handle: Handle, lower: &[f64], upper: &[f64]) -> Result<(), ApiError> {
    registry().with_session(handle, "set column bounds", |session| {
        session.set_column_bounds(lower, upper)
    })
}

/// Provide an advisory starting point for the solver.
pub fn set_column_start(handle: Handle, values: &[f64]) -> Result<(), ApiError> {
    registry().with_session(handle, "set column start", |session| {
        session.set_column_start(values)
    })
}

pub fn set_column_integrality(handle: Handle, is_integer: &[bool]) -> Result<(), ApiError> {
    registry().with_session(handle, "set column integrality", |session| {
        session.set_column_integrality(is_integer)
    })
}

/// Add a row given one coefficient per column; zeros are dropped.
pub fn add_full_row(
    handle: Handle,
    coefficients: &[f64],
    lower: f64,
    upper: f64,
) -> Result<(), ApiError> {
    registry().with_session(handle, "add full row", |session| {
        session.add_dense_row(coefficients, lower, upper).map(drop)
    })
}

pub fn add_sparse_row(
    handle: Handle,
    coefficients: &[f64],
    indices: &[i32],
    lower: f64,
    upper: f64,
) -> Result<(), ApiError> {
    registry().with_session(handle, "add sparse row", |session| {
        session
            .add_sparse_row(coefficients, indices, lower, upper)
            .map(drop)
    })
}

/// Like [`add_sparse_row`], but the coefficient pattern is shared with every
/// value-equal row added through this function by any session.
pub fn add_sparse_row_cached(
    handle: Handle,
    coefficients: &[f64],
    indices: &[i32],
    lower: f64,
    upper: f64,
) -> Result<(), ApiError> {
    registry().with_session(handle, "add cached sparse row", |session| {
        session
            .add_sparse_row_cached(coefficients, indices, lower, upper)
            .map(drop)
    })
}

/// Add `row_count` rows in compressed row layout.
///
/// The batch is validated as a whole; on error no row is added.
pub fn add_sparse_rows(
    handle: Handle,
    row_count: i32,
    row_starts: &[i32],
    column_indices: &[i32],
    coefficients: &[f64],
    lower: &[f64],
    upper: &[f64],
) -> Result<(), ApiError> {
    let batch = CsrBatch {
        row_starts,
        column_indices,
        coefficients,
        lower,
        upper,
    };
    registry().with_session(handle, "add sparse rows", |session| {
        let row_count =
            usize::try_from(row_count).map_err(|_| ModelError::NegativeDimension {
                what: "row_count",
                value: i64::from(row_count),
            })?;
        session
            .add_sparse_rows(row_count, batch)
            .map(drop)
            .map_err(ApiError::from)
    })
}

/// Solve and return the status code (`0` optimal, `1` infeasible,
/// `2` unbounded, `3` time limit, `4` error).
pub fn solve(handle: Handle) -> Result<i32, ApiError> {
    registry().with_session(handle, "solve", |session| {
        session.solve().map(|status| status.code())
    })
}

/// Copy of the column values from the last solve.
pub fn get_column_solution(handle: Handle) -> Result<Vec<f64>, ApiError> {
    registry().with_session(handle, "get column solution", |session| {
        session.column_solution().map(<[f64]>::to_vec)
    })
}

/// Objective value of the last solve in the maximization sense.
pub fn get_score(handle: Handle) -> Result<f64, ApiError> {
    registry().with_session(handle, "get score", |session| session.score())
}

/// Hit and miss counters of the shared row cache.
pub fn cache_stats() -> CacheStats {
    registry().cache_stats()
}

/// Number of sessions not yet disposed.
pub fn live_sessions() -> usize {
    registry().len()
}
