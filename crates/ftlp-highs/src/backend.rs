//! `Backend` implementation on top of [`HighsModel`].

use std::time::Instant;

use ftlp_core::{Backend, Column, Model};
use ftlp_solver::{Solution, SolverConfig, SolverError, SolverStatus};
use ftlp_tools::memory::{MemorySnapshot, rss_delta};
use tracing::{debug, trace, warn};

use crate::ffi::{
    HighsModel, HighsModelError, HighsOption, HighsStatus, highs_infinity, highs_version,
};
use crate::status::{highs_status_string, score_without_point, to_solver_status};

/// Stateless HiGHS backend; each solve builds a fresh HiGHS problem.
#[derive(Debug, Clone, Copy, Default)]
pub struct HighsBackend;

impl HighsBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Backend for HighsBackend {
    fn name(&self) -> &'static str {
        "highs"
    }

    fn infinity(&self) -> f64 {
        highs_infinity()
    }

    fn solve(&mut self, model: &Model, config: &SolverConfig) -> Result<Solution, SolverError> {
        solve_model(model, config)
    }
}

fn rejected(err: HighsModelError) -> SolverError {
    SolverError::ModelRejected(err.to_string())
}

fn internal(err: HighsModelError) -> SolverError {
    SolverError::InternalError(err.to_string())
}

fn solve_failed(err: HighsModelError) -> SolverError {
    match err {
        HighsModelError::SolveFailed { .. } => internal(err),
        _ => rejected(err),
    }
}

fn apply_solver_config(highs_model: &mut HighsModel, config: &SolverConfig) {
    debug!(
        component = "solver",
        operation = "apply_config",
        status = "start",
        defaults_only = config.is_empty(),
        time_limit = ?config.time_limit,
        "Applying solver configuration"
    );
    highs_model.set_log_to_console(config.log_to_console.unwrap_or(false));

    if let Some(limit) = config.time_limit {
        highs_model.set_option("time_limit", HighsOption::Float(limit));
    }
    if let Some(gap) = config.mip_gap {
        highs_model.set_option("mip_rel_gap", HighsOption::Float(gap));
    }
    if let Some(level) = config.verbosity {
        highs_model.set_verbosity(level);
    }
    if let Some(presolve) = config.presolve {
        let presolve_str = if presolve { "on" } else { "off" };
        highs_model.set_option("presolve", HighsOption::Str(presolve_str.to_string()));
    }
    if let Some(threads) = config.threads {
        highs_model.set_option(
            "threads",
            HighsOption::Int(i32::try_from(threads).unwrap_or(i32::MAX)),
        );
    }
    if let Some(tolerance) = config.tolerance {
        highs_model.set_option(
            "primal_feasibility_tolerance",
            HighsOption::Float(tolerance),
        );
        highs_model.set_option("dual_feasibility_tolerance", HighsOption::Float(tolerance));
    }
}

fn add_columns(model: &Model, highs_model: &mut HighsModel) {
    for (column, &objective) in model.columns().iter().zip(model.objective()) {
        let Column {
            bounds,
            is_integer,
        } = *column;
        if is_integer {
            highs_model.add_integer_col(bounds.lower, bounds.upper, objective);
        } else {
            highs_model.add_col(bounds.lower, bounds.upper, objective);
        }
    }
    debug!(
        component = "solver",
        operation = "add_columns",
        status = "success",
        num_columns = model.num_columns(),
        "Added all columns to HiGHS"
    );
}

fn add_rows(model: &Model, highs_model: &mut HighsModel) -> Result<(), SolverError> {
    let started = Instant::now();
    for (index, row) in model.rows().enumerate() {
        highs_model
            .add_row(
                row.bounds.lower,
                row.bounds.upper,
                row.indices,
                row.coefficients,
            )
            .map_err(rejected)?;
        trace!(
            component = "solver",
            operation = "add_row",
            status = "success",
            row = index,
            nonzeros = row.indices.len(),
            "Added row to HiGHS"
        );
    }
    debug!(
        component = "solver",
        operation = "add_rows",
        status = "success",
        num_rows = model.num_rows(),
        num_nonzeros = model.num_nonzeros(),
        shared_rows = model.num_shared_rows(),
        duration_ms = started.elapsed().as_secs_f64() * 1000.0,
        "Added all rows to HiGHS"
    );
    Ok(())
}

/// A model without columns never reaches HiGHS: every row reads `0`, so it is
/// optimal with score `0` exactly when each row range contains `0`.
fn solve_without_columns(model: &Model) -> Solution {
    let feasible = model.rows().all(|row| row.bounds.contains(0.0));
    debug!(
        component = "solver",
        operation = "solve",
        status = "success",
        num_rows = model.num_rows(),
        feasible,
        "Resolved column-free model without HiGHS"
    );
    if feasible {
        Solution::new(SolverStatus::Optimal, Vec::new(), 0.0)
            .with_row_values(vec![0.0; model.num_rows()])
    } else {
        Solution::new(
            SolverStatus::Infeasible,
            Vec::new(),
            score_without_point(SolverStatus::Infeasible),
        )
    }
}

fn capture_rss(stage: &str) -> Option<u64> {
    MemorySnapshot::capture(stage)
        .ok()
        .map(|snapshot| snapshot.rss_bytes)
}

fn build_and_solve(
    model: &Model,
    config: &SolverConfig,
) -> Result<(HighsModel, HighsStatus), SolverError> {
    let mut highs_model = HighsModel::new();
    apply_solver_config(&mut highs_model, config);
    add_columns(model, &mut highs_model);
    add_rows(model, &mut highs_model)?;
    if let Some(start) = model.column_start() {
        if let Err(err) = highs_model.set_primal_start(start.to_vec()) {
            warn!(
                component = "solver",
                operation = "set_primal_start",
                status = "warn",
                %err,
                "Ignoring start point"
            );
        }
    }
    let status = highs_model.solve().map_err(solve_failed)?;
    Ok((highs_model, status))
}

/// Maximize `model` with HiGHS under `config`.
///
/// The returned solution always has `model.num_columns()` column values.
/// Statuses without a feasible point carry zero column values and score
/// `-inf` (infeasible), `+inf` (unbounded) or `NaN`.
pub fn solve_model(model: &Model, config: &SolverConfig) -> Result<Solution, SolverError> {
    let solve_started = Instant::now();
    if model.num_columns() == 0 {
        return Ok(solve_without_columns(model)
            .with_solve_time(solve_started.elapsed().as_secs_f64()));
    }

    let solver_version = highs_version().unwrap_or_else(|| "unknown".to_string());
    let rss_before = capture_rss("solve_start");
    debug!(
        component = "solver",
        operation = "solve",
        status = "start",
        solver = "highs",
        solver_version = %solver_version,
        rss_bytes = ?rss_before,
        "Starting solve process"
    );

    let (mut highs_model, mut highs_status) = build_and_solve(model, config)?;
    if highs_status == HighsStatus::UnboundedOrInfeasible && config.presolve != Some(false) {
        debug!(
            component = "solver",
            operation = "solve",
            status = "retry",
            solver = "highs",
            "Presolve left infeasible and unbounded undecided; solving again without presolve"
        );
        let retry = config.clone().with_presolve(false);
        (highs_model, highs_status) = build_and_solve(model, &retry)?;
    }
    let status = to_solver_status(highs_status);
    let solve_seconds = solve_started.elapsed().as_secs_f64();
    let rss_after = capture_rss("solve_end");
    let has_point =
        status.is_optimal() || (status.has_solution() && highs_model.has_feasible_primal());
    let mip_gap = if model.has_integer_columns() {
        highs_model.mip_gap()
    } else {
        f64::NAN
    };

    debug!(
        component = "solver",
        operation = "solve",
        status = "success",
        solver = "highs",
        solver_version = %solver_version,
        highs_status = highs_status_string(highs_status),
        solver_status = %status,
        has_point,
        simplex_iterations = highs_model.simplex_iteration_count(),
        mip_gap,
        duration_ms = solve_seconds * 1000.0,
        rss_bytes = ?rss_after,
        rss_delta_bytes = ?rss_delta(rss_before, rss_after),
        "HiGHS solve completed"
    );

    let num_columns = model.num_columns();
    let solution = if has_point {
        let (mut column_values, row_values) = highs_model
            .solution_snapshot()
            .map_err(internal)?
            .into_parts();
        column_values.resize(num_columns, 0.0);
        let objective_value = highs_model.objective_value().map_err(internal)?;
        Solution::new(status, column_values, objective_value).with_row_values(row_values)
    } else {
        if status == SolverStatus::TimeLimit {
            warn!(
                component = "solver",
                operation = "solve",
                status = "warn",
                solver = "highs",
                duration_ms = solve_seconds * 1000.0,
                "Limit reached before any feasible point was found"
            );
        }
        Solution::new(
            status,
            vec![0.0; num_columns],
            score_without_point(status),
        )
    };

    Ok(solution
        .with_solve_time(solve_seconds)
        .with_mip_gap(mip_gap))
}
