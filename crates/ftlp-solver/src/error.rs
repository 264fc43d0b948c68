//! Solver error types.

/// Failure reported by a solver backend.
///
/// These are engine failures, not model outcomes: an infeasible or unbounded
/// model is reported through [`crate::SolverStatus`] instead.
#[derive(Debug, Clone, PartialEq)]
pub enum SolverError {
    /// The engine refused to load the model.
    ModelRejected(String),
    /// The engine failed while running.
    InternalError(String),
    /// The engine could not be reached at all.
    SolverNotAvailable(String),
}

impl SolverError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            SolverError::ModelRejected(_) => "SOLVER_MODEL_REJECTED",
            SolverError::InternalError(_) => "SOLVER_INTERNAL",
            SolverError::SolverNotAvailable(_) => "SOLVER_NOT_AVAILABLE",
        }
    }
}

impl std::fmt::Display for SolverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolverError::ModelRejected(msg) => {
                write!(f, "[{}] Solver rejected the model: {}", self.code(), msg)
            }
            SolverError::InternalError(msg) => {
                write!(f, "[{}] Solver internal error: {}", self.code(), msg)
            }
            SolverError::SolverNotAvailable(msg) => {
                write!(f, "[{}] Solver not available: {}", self.code(), msg)
            }
        }
    }
}

impl std::error::Error for SolverError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_internal_error() {
        let err = SolverError::InternalError("something went wrong".to_string());
        let msg = format!("{}", err);
        assert!(msg.contains("SOLVER_INTERNAL"));
        assert!(msg.contains("something went wrong"));
    }

    #[test]
    fn test_error_display_model_rejected() {
        let err = SolverError::ModelRejected("bad matrix".to_string());
        let msg = err.to_string();
        assert!(msg.starts_with("[SOLVER_MODEL_REJECTED]"));
        assert!(msg.contains("bad matrix"));
    }

    #[test]
    fn test_error_code() {
        assert_eq!(
            SolverError::SolverNotAvailable(String::new()).code(),
            "SOLVER_NOT_AVAILABLE"
        );
        assert_eq!(
            SolverError::ModelRejected(String::new()).code(),
            "SOLVER_MODEL_REJECTED"
        );
    }
}
