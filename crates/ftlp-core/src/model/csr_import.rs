//! Bulk row ingest from a CSR-style batch.

use std::ops::Range;

use crate::types::{Bounds, ColumnIndex};

use crate::model::error::ModelError;
use crate::model::{Model, check_row_bounds};

/// A batch of sparse rows in compressed row layout.
///
/// Row `r` owns entries `row_starts[r]..row_starts[r + 1]` of the flat
/// `column_indices` / `coefficients` buffers.
#[derive(Debug, Clone, Copy)]
pub struct CsrBatch<'a, I> {
    pub row_starts: &'a [I],
    pub column_indices: &'a [I],
    pub coefficients: &'a [f64],
    pub lower: &'a [f64],
    pub upper: &'a [f64],
}

impl Model {
    /// Append `row_count` rows from a CSR batch.
    ///
    /// The whole offset table is checked first, so a malformed batch is
    /// reported as such even when an earlier row also has bad contents. Every
    /// row is then validated before the first one is appended, so a rejected batch leaves the model unchanged. On success the
    /// model is in the same state as after calling [`Model::add_sparse_row`]
    /// once per row; the returned range holds the new row indices.
    pub fn add_sparse_rows<I: ColumnIndex>(
        &mut self,
        row_count: usize,
        batch: CsrBatch<'_, I>,
    ) -> Result<Range<usize>, ModelError> {
        let CsrBatch {
            row_starts,
            column_indices,
            coefficients,
            lower,
            upper,
        } = batch;

        if row_starts.len() != row_count + 1 {
            return Err(ModelError::malformed(format!(
                "row_starts length must be row_count + 1 (expected {}, got {})",
                row_count + 1,
                row_starts.len()
            )));
        }
        if column_indices.len() != coefficients.len() {
            return Err(ModelError::malformed(format!(
                "column_indices ({}) and coefficients ({}) must be the same length",
                column_indices.len(),
                coefficients.len()
            )));
        }
        if lower.len() != row_count {
            return Err(ModelError::DimensionMismatch {
                what: "row lower bounds",
                expected: row_count,
                got: lower.len(),
            });
        }
        if upper.len() != row_count {
            return Err(ModelError::DimensionMismatch {
                what: "row upper bounds",
                expected: row_count,
                got: upper.len(),
            });
        }
        if row_starts.first().and_then(|start| start.to_position()) != Some(0) {
            return Err(ModelError::malformed("row_starts must start at 0"));
        }
        if row_starts.last().and_then(|end| end.to_position()) != Some(coefficients.len()) {
            return Err(ModelError::malformed(
                "row_starts last entry must equal the buffer length",
            ));
        }

        let mut offsets: Vec<Range<usize>> = Vec::with_capacity(row_count);
        for (row, pair) in row_starts.windows(2).enumerate() {
            let (Some(start), Some(end)) = (pair[0].to_position(), pair[1].to_position()) else {
                return Err(ModelError::malformed(format!(
                    "row_starts must not be negative (row {row})"
                )));
            };
            if start > end || end > coefficients.len() {
                return Err(ModelError::malformed(format!(
                    "row_starts must be non-decreasing (row {row})"
                )));
            }
            offsets.push(start..end);
        }

        let mut ranges: Vec<(Range<usize>, Bounds)> = Vec::with_capacity(row_count);
        for (row, range) in offsets.into_iter().enumerate() {
            let bounds = check_row_bounds(lower[row], upper[row])?;
            self.validate_sparse_entries(
                &coefficients[range.clone()],
                &column_indices[range.clone()],
            )?;
            ranges.push((range, bounds));
        }

        let first_row = self.rows.len();
        self.row_indices.reserve(column_indices.len());
        self.row_values.reserve(coefficients.len());
        self.rows.reserve(row_count);
        for (range, bounds) in ranges {
            self.push_inline_row(
                &coefficients[range.clone()],
                &column_indices[range],
                bounds,
            );
        }

        tracing::debug!(
            component = "model",
            operation = "add_sparse_rows",
            status = "success",
            rows = row_count,
            nonzeros = coefficients.len(),
            "Added sparse row batch"
        );
        Ok(first_row..self.rows.len())
    }
}
