//! Solution record returned by a backend.

use crate::SolverStatus;

/// Result of one solve.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Column values, one per model column.
    pub column_values: Vec<f64>,
    /// Row activities (constraint left-hand side at the solution), one per row.
    /// Empty when the backend did not report them.
    pub row_values: Vec<f64>,
    /// Objective value achieved by `column_values`, in the maximization sense.
    pub objective_value: f64,
    /// Status of the solve.
    pub status: SolverStatus,
    /// Wall-clock solve time in seconds.
    pub solve_time_seconds: f64,
    /// Relative MIP gap; `NaN` for pure LPs or when unknown.
    pub mip_gap: f64,
}

impl Solution {
    /// Create a solution with the given status, column values and objective.
    pub fn new(status: SolverStatus, column_values: Vec<f64>, objective_value: f64) -> Self {
        Self {
            column_values,
            row_values: Vec::new(),
            objective_value,
            status,
            solve_time_seconds: 0.0,
            mip_gap: f64::NAN,
        }
    }

    /// Create a solution without a meaningful point: all columns are zero.
    pub fn zeroed(status: SolverStatus, num_columns: usize) -> Self {
        Self::new(status, vec![0.0; num_columns], 0.0)
    }

    /// Attach row activities.
    pub fn with_row_values(mut self, row_values: Vec<f64>) -> Self {
        self.row_values = row_values;
        self
    }

    /// Attach the solve time.
    pub fn with_solve_time(mut self, seconds: f64) -> Self {
        self.solve_time_seconds = seconds;
        self
    }

    /// Attach the MIP gap.
    pub fn with_mip_gap(mut self, gap: f64) -> Self {
        self.mip_gap = gap;
        self
    }

    /// Get the value of the column at the given index.
    pub fn get_column(&self, index: usize) -> Option<f64> {
        self.column_values.get(index).copied()
    }

    /// Get the activity of the row at the given index.
    pub fn get_row(&self, index: usize) -> Option<f64> {
        self.row_values.get(index).copied()
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_zeroed_solution_has_one_value_per_column() {
        let solution = Solution::zeroed(SolverStatus::TimeLimit, 4);
        assert_eq!(solution.column_values, vec![0.0; 4]);
        assert_eq!(solution.objective_value, 0.0);
        assert!(solution.row_values.is_empty());
        assert!(solution.mip_gap.is_nan());
    }

    #[test]
    fn test_builder_attaches_metadata() {
        let solution = Solution::new(SolverStatus::Optimal, vec![1.0, 2.0], 3.0)
            .with_row_values(vec![3.0])
            .with_solve_time(0.25)
            .with_mip_gap(0.0);
        assert_eq!(solution.get_column(1), Some(2.0));
        assert_eq!(solution.get_column(2), None);
        assert_eq!(solution.get_row(0), Some(3.0));
        assert_eq!(solution.solve_time_seconds, 0.25);
        assert_eq!(solution.mip_gap, 0.0);
    }
}
