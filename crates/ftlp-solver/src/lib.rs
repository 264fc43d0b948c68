//! Shared solver types for ftlp.
//!
//! These types are solver-agnostic: the model buffer and session layers speak
//! only in terms of them, and a backend (such as `ftlp-highs`) translates them
//! to and from its own engine.
//!
//! - [`SolverConfig`]: options applied to a single solve
//! - [`SolverStatus`]: the five outcomes a solve can report
//! - [`Solution`]: the result record of a solve
//! - [`SolverError`]: engine failures surfaced by a backend

mod config;
mod error;
mod solution;
mod status;

pub use config::SolverConfig;
pub use error::SolverError;
pub use solution::Solution;
pub use status::SolverStatus;
