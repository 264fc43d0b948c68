//! Read access to the model buffer.

use crate::types::{Bounds, Column};

use super::{Model, RowRecord, RowStorage};

/// Borrowed view of one row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowView<'a> {
    pub indices: &'a [u32],
    pub coefficients: &'a [f64],
    pub bounds: Bounds,
}

impl RowView<'_> {
    /// Evaluate the row's left-hand side at `point`.
    pub fn activity(&self, point: &[f64]) -> f64 {
        self.indices
            .iter()
            .zip(self.coefficients)
            .map(|(&column, &coefficient)| {
                coefficient * point.get(column as usize).copied().unwrap_or(0.0)
            })
            .sum()
    }
}

impl Model {
    /// Get the number of columns.
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Get the number of rows.
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Get the number of stored nonzero coefficients, shared rows included.
    pub fn num_nonzeros(&self) -> usize {
        self.rows
            .iter()
            .map(|record| match &record.storage {
                RowStorage::Inline { start, end } => end - start,
                RowStorage::Shared(row) => row.len(),
            })
            .sum()
    }

    /// Get the number of rows that point at a cache entry.
    pub fn num_shared_rows(&self) -> usize {
        self.rows
            .iter()
            .filter(|record| matches!(record.storage, RowStorage::Shared(_)))
            .count()
    }

    /// Get a column by index.
    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    /// Get all columns.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Get the objective coefficients (maximized).
    pub fn objective(&self) -> &[f64] {
        &self.objective
    }

    /// Get the advisory start point, if one was set.
    pub fn column_start(&self) -> Option<&[f64]> {
        self.column_start.as_deref()
    }

    /// Whether any column is integer-constrained.
    pub fn has_integer_columns(&self) -> bool {
        self.columns.iter().any(|column| column.is_integer)
    }

    /// Get a row by index.
    pub fn row(&self, index: usize) -> Option<RowView<'_>> {
        self.rows.get(index).map(|record| self.view(record))
    }

    /// Whether the row at `index` points at a cache entry.
    pub fn is_row_shared(&self, index: usize) -> bool {
        self.rows
            .get(index)
            .is_some_and(|record| matches!(record.storage, RowStorage::Shared(_)))
    }

    /// Iterate rows in insertion order.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = RowView<'_>> {
        self.rows.iter().map(|record| self.view(record))
    }

    /// Objective value at `point`.
    pub fn objective_value(&self, point: &[f64]) -> f64 {
        self.objective
            .iter()
            .zip(point)
            .map(|(coefficient, value)| coefficient * value)
            .sum()
    }

    fn view<'a>(&'a self, record: &'a RowRecord) -> RowView<'a> {
        match &record.storage {
            RowStorage::Inline { start, end } => RowView {
                indices: &self.row_indices[*start..*end],
                coefficients: &self.row_values[*start..*end],
                bounds: record.bounds,
            },
            RowStorage::Shared(row) => RowView {
                indices: row.indices(),
                coefficients: row.coefficients(),
                bounds: record.bounds,
            },
        }
    }
}
