use crate::types::Bounds;

use super::Model;

/// Owned copy of one row, for comparing models.
pub(super) type RowSnapshot = (Vec<u32>, Vec<f64>, Bounds);

pub(super) fn model_with_columns(num_columns: usize) -> Model {
    Model::new(num_columns, 0).unwrap()
}

pub(super) fn snapshot_rows(model: &Model) -> Vec<RowSnapshot> {
    model
        .rows()
        .map(|row| (row.indices.to_vec(), row.coefficients.to_vec(), row.bounds))
        .collect()
}
