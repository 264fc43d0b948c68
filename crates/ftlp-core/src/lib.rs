//! ftlp core: incremental LP/MILP model construction and the solve lifecycle.
//!
//! A [`Model`] is a fixed set of columns plus a growing list of rows kept in a
//! compressed row layout. A [`Session`] owns one model, drives it through
//! `Building -> Solving -> Solved | Failed`, and hands it to a [`Backend`] on
//! solve. Structurally repeated rows can be routed through a shared
//! [`SparseRowCache`] so they are validated and allocated once.
//!
//! The objective is always maximized.

pub mod error;
pub mod model;
pub mod row_cache;
pub mod session;
pub mod solver;
pub mod types;

pub use error::ErrorKind;
pub use model::{CsrBatch, Model, ModelError, RowView};
pub use row_cache::{CacheStats, RowSignature, SparseRow, SparseRowCache};
pub use session::{Session, SessionError, SessionState};
pub use solver::Backend;
pub use types::{Bounds, Column, ColumnIndex};

pub use ftlp_solver::{Solution, SolverConfig, SolverError, SolverStatus};
