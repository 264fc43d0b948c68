//! Model buffer for one optimization problem.
//!
//! # Module Organization
//!
//! - [`error`]: Model error types
//! - [`builder`]: Objective, column and single-row mutations
//! - [`csr_import`]: Bulk row ingest from a CSR-style batch
//! - [`storage`]: Read access to columns and rows
//!
//! # Layout
//!
//! The column count is fixed at construction. Rows are appended into two flat
//! buffers (`u32` column indices and `f64` coefficients); each row record keeps
//! only its bounds and a `start..end` range into them. Rows that came through
//! the [`SparseRowCache`](crate::SparseRowCache) instead point at the shared,
//! immutable cache entry, so repeated patterns occupy memory once.

mod builder;
mod csr_import;
mod error;
mod storage;

use crate::row_cache::SparseRow;
use crate::types::{Bounds, Column, ColumnIndex};
use std::sync::Arc;

pub use csr_import::CsrBatch;
pub use error::ModelError;
pub use storage::RowView;

/// Largest column count the model accepts; indices must fit the capability's `i32`.
pub const MAX_COLUMNS: usize = i32::MAX as usize;

#[derive(Debug, Clone)]
pub(crate) enum RowStorage {
    /// Range into the model's flat row buffers.
    Inline { start: usize, end: usize },
    /// Entry owned by the sparse row cache.
    Shared(Arc<SparseRow>),
}

#[derive(Debug, Clone)]
pub(crate) struct RowRecord {
    pub(crate) bounds: Bounds,
    pub(crate) storage: RowStorage,
}

/// Mutable in-progress representation of one LP/MILP.
#[derive(Debug, Clone)]
pub struct Model {
    pub(crate) columns: Vec<Column>,
    pub(crate) objective: Vec<f64>,
    pub(crate) column_start: Option<Vec<f64>>,
    pub(crate) rows: Vec<RowRecord>,
    pub(crate) row_indices: Vec<u32>,
    pub(crate) row_values: Vec<f64>,
    scratch: IndexScratch,
}

impl Model {
    /// Create a model with `num_columns` default columns.
    ///
    /// `row_hint` pre-sizes the row table; rows may still grow past it.
    pub fn new(num_columns: usize, row_hint: usize) -> Result<Self, ModelError> {
        if num_columns > MAX_COLUMNS {
            return Err(ModelError::TooManyColumns {
                requested: num_columns,
                max: MAX_COLUMNS,
            });
        }
        tracing::debug!(
            component = "model",
            operation = "create",
            status = "success",
            num_columns,
            row_hint,
            "Created model buffer"
        );
        Ok(Self {
            columns: vec![Column::default(); num_columns],
            objective: vec![0.0; num_columns],
            column_start: None,
            rows: Vec::with_capacity(row_hint),
            row_indices: Vec::new(),
            row_values: Vec::new(),
            scratch: IndexScratch::new(num_columns),
        })
    }

    /// Validate one sparse row's entries against this model.
    ///
    /// Checks lengths, index range, duplicates and coefficient finiteness
    /// without allocating.
    pub(crate) fn validate_sparse_entries<I: ColumnIndex>(
        &mut self,
        coefficients: &[f64],
        indices: &[I],
    ) -> Result<(), ModelError> {
        if coefficients.len() != indices.len() {
            return Err(ModelError::DimensionMismatch {
                what: "sparse row coefficients",
                expected: indices.len(),
                got: coefficients.len(),
            });
        }
        let num_columns = self.columns.len();
        let generation = self.scratch.next_generation();
        for (position, (&index, &coefficient)) in indices.iter().zip(coefficients).enumerate() {
            let column = index
                .to_position()
                .filter(|&column| column < num_columns)
                .ok_or(ModelError::ColumnIndexOutOfRange {
                    index: index.raw(),
                    num_columns,
                })?;
            if !coefficient.is_finite() {
                return Err(ModelError::InvalidCoefficient {
                    position,
                    coefficient,
                });
            }
            if !self.scratch.mark(column, generation) {
                return Err(ModelError::DuplicateColumnIndex { column });
            }
        }
        Ok(())
    }

    /// Append validated entries as an inline row.
    pub(crate) fn push_inline_row<I: ColumnIndex>(
        &mut self,
        coefficients: &[f64],
        indices: &[I],
        bounds: Bounds,
    ) -> usize {
        let start = self.row_indices.len();
        self.row_indices.extend(
            indices
                .iter()
                .map(|index| index.to_position().unwrap_or_default() as u32),
        );
        self.row_values.extend_from_slice(coefficients);
        let end = self.row_indices.len();
        self.push_record(bounds, RowStorage::Inline { start, end })
    }

    pub(crate) fn push_record(&mut self, bounds: Bounds, storage: RowStorage) -> usize {
        self.rows.push(RowRecord { bounds, storage });
        self.rows.len() - 1
    }
}

pub(crate) fn check_row_bounds(lower: f64, upper: f64) -> Result<Bounds, ModelError> {
    let bounds = Bounds::new(lower, upper);
    if bounds.is_valid() {
        Ok(bounds)
    } else {
        tracing::warn!(
            component = "model",
            operation = "add_row",
            status = "error",
            lower,
            upper,
            "Rejected row bounds"
        );
        Err(ModelError::InvalidRowBounds { lower, upper })
    }
}

/// Generation-stamped marks used for duplicate detection.
///
/// Each validation pass takes a fresh generation, so marks never need clearing
/// except when the counter wraps.
#[derive(Debug, Clone)]
struct IndexScratch {
    marks: Vec<u32>,
    generation: u32,
}

impl IndexScratch {
    fn new(num_columns: usize) -> Self {
        Self {
            marks: vec![0; num_columns],
            generation: 0,
        }
    }

    fn next_generation(&mut self) -> u32 {
        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            self.marks.fill(0);
            self.generation = 1;
        }
        self.generation
    }

    /// Mark `column`; returns false if it was already marked in this generation.
    fn mark(&mut self, column: usize, generation: u32) -> bool {
        let slot = &mut self.marks[column];
        if *slot == generation {
            false
        } else {
            *slot = generation;
            true
        }
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    mod batch;
    mod rows;
    mod support;

    #[test]
    fn test_new_model_has_default_columns() {
        let model = Model::new(3, 10).unwrap();
        assert_eq!(model.num_columns(), 3);
        assert_eq!(model.num_rows(), 0);
        assert_eq!(model.num_nonzeros(), 0);
        assert_eq!(model.objective(), &[0.0, 0.0, 0.0]);
        for index in 0..3 {
            assert_eq!(model.column(index), Some(&Column::default()));
        }
        assert!(model.column_start().is_none());
    }

    #[test]
    fn test_zero_column_model_is_allowed() {
        let model = Model::new(0, 0).unwrap();
        assert_eq!(model.num_columns(), 0);
    }

    #[test]
    fn test_too_many_columns_rejected() {
        let result = Model::new(MAX_COLUMNS + 1, 0);
        assert!(matches!(result, Err(ModelError::TooManyColumns { .. })));
    }

    #[test]
    fn test_scratch_detects_duplicates_per_generation() {
        let mut scratch = IndexScratch::new(4);
        let first = scratch.next_generation();
        assert!(scratch.mark(2, first));
        assert!(!scratch.mark(2, first));

        let second = scratch.next_generation();
        assert!(scratch.mark(2, second));
    }

    #[test]
    fn test_scratch_wraps_generation() {
        let mut scratch = IndexScratch::new(2);
        scratch.generation = u32::MAX;
        scratch.marks[0] = 1;
        let generation = scratch.next_generation();
        assert_eq!(generation, 1);
        assert!(scratch.mark(0, generation));
    }
}
