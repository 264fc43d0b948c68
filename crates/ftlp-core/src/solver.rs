//! Solver backend seam.
//!
//! A [`Backend`] turns a finished [`Model`] into a [`Solution`]. The session
//! layer only depends on this trait, so the model, cache and lifecycle code
//! stays free of any particular solver library.

use crate::Model;
use ftlp_solver::{Solution, SolverConfig, SolverError};

/// A solver capable of maximizing a [`Model`].
pub trait Backend {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// The value this backend treats as unbounded.
    fn infinity(&self) -> f64 {
        f64::INFINITY
    }

    /// Maximize `model` under `config`.
    ///
    /// A returned [`Solution`] always carries a status; statuses without a
    /// usable point may leave `column_values` empty or zeroed.
    fn solve(&mut self, model: &Model, config: &SolverConfig) -> Result<Solution, SolverError>;
}
