//! Model builder methods for the objective, columns and single rows.

use crate::row_cache::{RowSignature, SparseRow, SparseRowCache};
use crate::types::{Bounds, ColumnIndex};

use crate::model::error::ModelError;
use crate::model::{Model, RowStorage, check_row_bounds};

impl Model {
    fn expect_column_len(&self, what: &'static str, got: usize) -> Result<(), ModelError> {
        if got == self.columns.len() {
            Ok(())
        } else {
            tracing::warn!(
                component = "model",
                operation = what,
                status = "error",
                expected = self.columns.len(),
                got,
                "Length does not match column count"
            );
            Err(ModelError::DimensionMismatch {
                what,
                expected: self.columns.len(),
                got,
            })
        }
    }

    /// Replace the objective vector.
    pub fn set_objective(&mut self, coefficients: &[f64]) -> Result<(), ModelError> {
        self.expect_column_len("objective", coefficients.len())?;
        if let Some((position, &coefficient)) = coefficients
            .iter()
            .enumerate()
            .find(|(_, coefficient)| !coefficient.is_finite())
        {
            return Err(ModelError::InvalidCoefficient {
                position,
                coefficient,
            });
        }
        self.objective.copy_from_slice(coefficients);
        tracing::debug!(
            component = "model",
            operation = "set_objective",
            status = "success",
            terms = coefficients.iter().filter(|c| **c != 0.0).count(),
            "Set objective function"
        );
        Ok(())
    }

    /// Replace all column bounds.
    ///
    /// Infinite values are allowed on either side; `lower > upper` is rejected
    /// for every column before anything is written.
    pub fn set_column_bounds(&mut self, lower: &[f64], upper: &[f64]) -> Result<(), ModelError> {
        self.expect_column_len("column lower bounds", lower.len())?;
        self.expect_column_len("column upper bounds", upper.len())?;
        for (column, (&lo, &hi)) in lower.iter().zip(upper).enumerate() {
            if !Bounds::new(lo, hi).is_valid() {
                tracing::warn!(
                    component = "model",
                    operation = "set_column_bounds",
                    status = "error",
                    column,
                    lower = lo,
                    upper = hi,
                    "Rejected column bounds"
                );
                return Err(ModelError::InvalidColumnBounds {
                    column,
                    lower: lo,
                    upper: hi,
                });
            }
        }
        for (column, (&lo, &hi)) in self.columns.iter_mut().zip(lower.iter().zip(upper)) {
            column.bounds = Bounds::new(lo, hi);
        }
        tracing::debug!(
            component = "model",
            operation = "set_column_bounds",
            status = "success",
            num_columns = lower.len(),
            "Set column bounds"
        );
        Ok(())
    }

    /// Set the advisory start point.
    pub fn set_column_start(&mut self, values: &[f64]) -> Result<(), ModelError> {
        self.expect_column_len("column start", values.len())?;
        match self.column_start.as_mut() {
            Some(start) => start.copy_from_slice(values),
            None => self.column_start = Some(values.to_vec()),
        }
        Ok(())
    }

    /// Mark columns as integer (`true`) or continuous (`false`).
    pub fn set_column_integrality(&mut self, is_integer: &[bool]) -> Result<(), ModelError> {
        self.expect_column_len("column integrality", is_integer.len())?;
        for (column, &flag) in self.columns.iter_mut().zip(is_integer) {
            column.is_integer = flag;
        }
        tracing::debug!(
            component = "model",
            operation = "set_column_integrality",
            status = "success",
            integer_columns = is_integer.iter().filter(|flag| **flag).count(),
            "Set column integrality"
        );
        Ok(())
    }

    /// Append a row given one coefficient per column.
    ///
    /// Only nonzero coefficients are stored.
    pub fn add_dense_row(
        &mut self,
        coefficients: &[f64],
        lower: f64,
        upper: f64,
    ) -> Result<usize, ModelError> {
        self.expect_column_len("dense row coefficients", coefficients.len())?;
        let bounds = check_row_bounds(lower, upper)?;
        if let Some((position, &coefficient)) = coefficients
            .iter()
            .enumerate()
            .find(|(_, coefficient)| !coefficient.is_finite())
        {
            return Err(ModelError::InvalidCoefficient {
                position,
                coefficient,
            });
        }

        let start = self.row_indices.len();
        for (column, &coefficient) in coefficients.iter().enumerate() {
            if coefficient != 0.0 {
                self.row_indices.push(column as u32);
                self.row_values.push(coefficient);
            }
        }
        let end = self.row_indices.len();
        let row = self.push_record(bounds, RowStorage::Inline { start, end });
        tracing::trace!(
            component = "model",
            operation = "add_dense_row",
            status = "success",
            row,
            nonzeros = end - start,
            lower,
            upper,
            "Added dense row"
        );
        Ok(row)
    }

    /// Append a row from parallel coefficient/index arrays.
    pub fn add_sparse_row<I: ColumnIndex>(
        &mut self,
        coefficients: &[f64],
        indices: &[I],
        lower: f64,
        upper: f64,
    ) -> Result<usize, ModelError> {
        let bounds = check_row_bounds(lower, upper)?;
        self.validate_sparse_entries(coefficients, indices)
            .inspect_err(|err| log_rejected_row("add_sparse_row", err))?;
        let row = self.push_inline_row(coefficients, indices, bounds);
        tracing::trace!(
            component = "model",
            operation = "add_sparse_row",
            status = "success",
            row,
            nonzeros = indices.len(),
            lower,
            upper,
            "Added sparse row"
        );
        Ok(row)
    }

    /// Append a row through the shared row cache.
    ///
    /// Same semantics as [`Model::add_sparse_row`]. When a value-equal row is
    /// already published in `cache`, its entry is reused as is and only its
    /// largest column is checked against this model; otherwise the row is
    /// validated, published and then referenced.
    pub fn add_sparse_row_cached<I: ColumnIndex>(
        &mut self,
        cache: &SparseRowCache,
        coefficients: &[f64],
        indices: &[I],
        lower: f64,
        upper: f64,
    ) -> Result<usize, ModelError> {
        let bounds = check_row_bounds(lower, upper)?;
        if coefficients.len() != indices.len() {
            return Err(ModelError::DimensionMismatch {
                what: "sparse row coefficients",
                expected: indices.len(),
                got: coefficients.len(),
            });
        }
        let signature = RowSignature::compute(coefficients, indices);

        let (entry, hit) = match cache.get(signature, coefficients, indices) {
            Some(entry) => {
                if let Some(max_column) = entry.max_column() {
                    if max_column >= self.columns.len() {
                        return Err(ModelError::ColumnIndexOutOfRange {
                            index: max_column as i64,
                            num_columns: self.columns.len(),
                        });
                    }
                }
                (entry, true)
            }
            None => {
                self.validate_sparse_entries(coefficients, indices)
                    .inspect_err(|err| log_rejected_row("add_sparse_row_cached", err))?;
                let row = SparseRow::from_validated(coefficients, indices);
                (cache.insert(signature, row), false)
            }
        };

        let row = self.push_record(bounds, RowStorage::Shared(entry));
        tracing::trace!(
            component = "model",
            operation = "add_sparse_row_cached",
            status = "success",
            row,
            cache_hit = hit,
            signature = signature.value(),
            nonzeros = indices.len(),
            "Added cached sparse row"
        );
        Ok(row)
    }
}

fn log_rejected_row(operation: &'static str, err: &ModelError) {
    tracing::warn!(
        component = "model",
        operation,
        status = "error",
        code = err.code(),
        "{err}"
    );
}
