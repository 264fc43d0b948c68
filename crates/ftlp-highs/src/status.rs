//! HiGHS status conversions.

use crate::ffi::HighsStatus;
use ftlp_solver::SolverStatus;

/// Map a HiGHS outcome onto the five session statuses.
///
/// Both limits count as `TimeLimit`: the solve stopped early and may carry a
/// feasible point. An empty model is trivially optimal.
///
/// `UnboundedOrInfeasible` maps to `Unbounded`. The backend only sees it here
/// after a second solve with presolve off still could not decide, or when the
/// caller had already switched presolve off; an infeasible model can then
/// still be reported as unbounded.
pub(crate) fn to_solver_status(status: HighsStatus) -> SolverStatus {
    match status {
        HighsStatus::Optimal | HighsStatus::ModelEmpty => SolverStatus::Optimal,
        HighsStatus::Infeasible => SolverStatus::Infeasible,
        HighsStatus::Unbounded | HighsStatus::UnboundedOrInfeasible => SolverStatus::Unbounded,
        HighsStatus::ReachedTimeLimit | HighsStatus::ReachedIterationLimit => {
            SolverStatus::TimeLimit
        }
        HighsStatus::Unknown => SolverStatus::Error,
    }
}

pub(crate) fn highs_status_string(status: HighsStatus) -> &'static str {
    match status {
        HighsStatus::Optimal => "optimal",
        HighsStatus::Infeasible => "infeasible",
        HighsStatus::Unbounded => "unbounded",
        HighsStatus::UnboundedOrInfeasible => "unbounded_or_infeasible",
        HighsStatus::ReachedTimeLimit => "time_limit",
        HighsStatus::ReachedIterationLimit => "iteration_limit",
        HighsStatus::ModelEmpty => "model_empty",
        HighsStatus::Unknown => "unknown",
    }
}

/// Score reported when the solve left no usable point.
///
/// In the maximization sense an empty feasible set scores `-inf` and an
/// unbounded one `+inf`; anything else has no defined score.
pub(crate) fn score_without_point(status: SolverStatus) -> f64 {
    match status {
        SolverStatus::Infeasible => f64::NEG_INFINITY,
        SolverStatus::Unbounded => f64::INFINITY,
        _ => f64::NAN,
    }
}
