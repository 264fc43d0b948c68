//! HiGHS backend for ftlp.
//!
//! [`HighsBackend`] implements [`ftlp_core::Backend`]: it copies a finished
//! [`ftlp_core::Model`] into a HiGHS row problem, maximizes it under the
//! session's [`ftlp_solver::SolverConfig`], and maps the outcome onto the five
//! solver statuses. [`HighsModel`] is the thin safe wrapper it drives.

mod backend;
pub mod ffi;
mod status;

pub use backend::{HighsBackend, solve_model};
pub use ffi::{
    HighsModel, HighsModelError, HighsOption, HighsStatus, SolutionSnapshot, highs_infinity,
    highs_version,
};
