//! Handle-based LP/MILP sessions.
//!
//! The [`api`] module is the flat capability surface: callers create a model
//! by handle, add objective, bounds and rows, solve, read the solution and
//! dispose the handle. It is backed by one process-wide [`SessionRegistry`]
//! using the HiGHS backend and a shared sparse row cache.
//!
//! ```no_run
//! use ftlp::api;
//!
//! let handle = api::construct_model(2, 1)?;
//! api::set_column_bounds(handle, &[0.0, 0.0], &[10.0, 10.0])?;
//! api::set_objective(handle, &[1.0, 1.0])?;
//! api::add_sparse_row(handle, &[1.0, 1.0], &[0, 1], -api::infinity(), 8.0)?;
//! assert_eq!(api::solve(handle)?, 0);
//! let score = api::get_score(handle)?;
//! api::dispose_model(handle)?;
//! # let _ = score;
//! # Ok::<(), ftlp::ApiError>(())
//! ```

pub mod api;
mod error;
pub mod logging;
mod registry;

pub use error::ApiError;
pub use registry::{Handle, SessionRegistry};

pub use ftlp_core::{ErrorKind, SessionState};
pub use ftlp_solver::{SolverConfig, SolverStatus};
