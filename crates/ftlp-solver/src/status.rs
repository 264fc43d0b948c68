//! Solver status types.

/// Outcome of a solve.
///
/// Every backend maps its native outcomes onto these five values. Only
/// [`SolverStatus::Error`] means the solve itself failed; the others are
/// ordinary results the caller branches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolverStatus {
    /// Optimal solution found.
    Optimal,
    /// Problem is infeasible.
    Infeasible,
    /// Problem is unbounded.
    Unbounded,
    /// Time limit reached; the solution is the best one found so far.
    TimeLimit,
    /// The engine failed.
    Error,
}

impl SolverStatus {
    /// Numeric status code exposed across the handle boundary.
    ///
    /// Codes follow the CLP convention: 0 optimal, 1 primal infeasible,
    /// 2 dual infeasible (unbounded), 3 stopped on limits, 4 stopped on errors.
    pub fn code(self) -> i32 {
        match self {
            SolverStatus::Optimal => 0,
            SolverStatus::Infeasible => 1,
            SolverStatus::Unbounded => 2,
            SolverStatus::TimeLimit => 3,
            SolverStatus::Error => 4,
        }
    }

    /// Inverse of [`SolverStatus::code`].
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(SolverStatus::Optimal),
            1 => Some(SolverStatus::Infeasible),
            2 => Some(SolverStatus::Unbounded),
            3 => Some(SolverStatus::TimeLimit),
            4 => Some(SolverStatus::Error),
            _ => None,
        }
    }

    /// Check if the status indicates an optimal solution.
    pub fn is_optimal(self) -> bool {
        matches!(self, SolverStatus::Optimal)
    }

    /// Check if the status carries a usable solution vector.
    pub fn has_solution(self) -> bool {
        matches!(self, SolverStatus::Optimal | SolverStatus::TimeLimit)
    }

    /// Check if the status indicates an engine failure.
    pub fn is_error(self) -> bool {
        matches!(self, SolverStatus::Error)
    }

    /// Get a human-readable string representation.
    pub fn as_str(self) -> &'static str {
        match self {
            SolverStatus::Optimal => "optimal",
            SolverStatus::Infeasible => "infeasible",
            SolverStatus::Unbounded => "unbounded",
            SolverStatus::TimeLimit => "time_limit",
            SolverStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
