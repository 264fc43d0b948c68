//! Instrumentation helpers for ftlp.
//!
//! Resident-set-size snapshots are taken around solves by the HiGHS backend and
//! per stage by the benchmark runner.

pub mod memory;

pub use memory::{MemoryError, MemoryProbe, MemorySnapshot, rss_delta};
