//! Safe wrapper around the HiGHS library.
//!
//! This module contains the crate's unsafe code: checked option setters, raw
//! info queries and the process-wide infinity lookup.
#![allow(unsafe_code)]

use highs::{Col, HighsModelStatus, Model, RowProblem, Sense, SolvedModel};
use std::ffi::{CStr, CString, c_char, c_void};
use std::fmt;
use std::sync::OnceLock;
use tracing::{debug, trace, warn};

/// `primal_solution_status` value reported when the primal point is feasible.
const PRIMAL_SOLUTION_FEASIBLE: i64 = 2;

/// Outcome of a HiGHS solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighsStatus {
    Optimal,
    Infeasible,
    Unbounded,
    UnboundedOrInfeasible,
    /// Time limit reached; a feasible point may exist.
    ReachedTimeLimit,
    /// Iteration limit reached; a feasible point may exist.
    ReachedIterationLimit,
    /// The model has no columns.
    ModelEmpty,
    /// Load, presolve, solve or postsolve error, or any status HiGHS adds later.
    Unknown,
}

/// Errors returned by the HiGHS model wrapper.
#[derive(Debug, Clone, PartialEq)]
pub enum HighsModelError {
    ColumnCoefficientLengthMismatch {
        columns: usize,
        coefficients: usize,
    },
    ColumnIndexOutOfBounds {
        column_index: u32,
        num_columns: usize,
    },
    PrimalStartLengthMismatch {
        expected: usize,
        got: usize,
    },
    SolveRequired {
        operation: &'static str,
    },
    /// HiGHS refused to load the problem, e.g. inconsistent bounds or huge
    /// matrix values.
    ProblemRejected {
        status: highs::HighsStatus,
    },
    OptionRejected {
        option: String,
    },
    /// `Highs_run` returned an error status.
    SolveFailed {
        status: highs::HighsStatus,
    },
}

impl fmt::Display for HighsModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HighsModelError::ColumnCoefficientLengthMismatch {
                columns,
                coefficients,
            } => write!(
                f,
                "columns length ({}) must match coefficients length ({})",
                columns, coefficients
            ),
            HighsModelError::ColumnIndexOutOfBounds {
                column_index,
                num_columns,
            } => write!(
                f,
                "column index {} out of bounds (num_columns = {})",
                column_index, num_columns
            ),
            HighsModelError::PrimalStartLengthMismatch { expected, got } => write!(
                f,
                "primal start length must match number of columns (expected {}, got {})",
                expected, got
            ),
            HighsModelError::SolveRequired { operation } => {
                write!(f, "solve must be called before {}", operation)
            }
            HighsModelError::ProblemRejected { status } => {
                write!(f, "HiGHS rejected the problem ({:?})", status)
            }
            HighsModelError::OptionRejected { option } => {
                write!(f, "HiGHS rejected the value of option '{}'", option)
            }
            HighsModelError::SolveFailed { status } => {
                write!(f, "HiGHS run failed ({:?})", status)
            }
        }
    }
}

impl std::error::Error for HighsModelError {}

/// Primal column values and row activities of a solved model.
#[derive(Debug, Clone)]
pub struct SolutionSnapshot {
    col_values: Vec<f64>,
    row_values: Vec<f64>,
}

impl SolutionSnapshot {
    pub fn col_values(&self) -> &[f64] {
        &self.col_values
    }

    pub fn row_values(&self) -> &[f64] {
        &self.row_values
    }

    /// Split into `(col_values, row_values)`.
    pub fn into_parts(self) -> (Vec<f64>, Vec<f64>) {
        (self.col_values, self.row_values)
    }
}

/// Option value types for HiGHS solver configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum HighsOption {
    Bool(bool),
    Int(i32),
    Float(f64),
    Str(String),
}

/// A HiGHS row problem that is always maximized.
pub struct HighsModel {
    problem: RowProblem,
    solved: Option<SolvedModel>,
    columns: Vec<Col>,
    log_to_console: bool,
    primal_start: Option<Vec<f64>>,
    options: Vec<(String, HighsOption)>,
    verbosity: Option<u32>,
}

impl HighsModel {
    pub fn new() -> Self {
        debug!(
            component = "solver",
            operation = "init_highs",
            status = "success",
            "Creating new HiGHS model"
        );
        HighsModel {
            problem: RowProblem::default(),
            solved: None,
            columns: Vec::new(),
            log_to_console: false,
            primal_start: None,
            options: Vec::new(),
            verbosity: None,
        }
    }

    /// Add a continuous column and return its index.
    pub fn add_col(&mut self, lower_bound: f64, upper_bound: f64, objective_coefficient: f64) -> usize {
        self.push_col(lower_bound, upper_bound, objective_coefficient, false)
    }

    /// Add an integer column and return its index.
    pub fn add_integer_col(
        &mut self,
        lower_bound: f64,
        upper_bound: f64,
        objective_coefficient: f64,
    ) -> usize {
        self.push_col(lower_bound, upper_bound, objective_coefficient, true)
    }

    fn push_col(
        &mut self,
        lower_bound: f64,
        upper_bound: f64,
        objective_coefficient: f64,
        is_integer: bool,
    ) -> usize {
        self.solved = None;
        self.primal_start = None;
        let col = if is_integer {
            self.problem
                .add_integer_column(objective_coefficient, lower_bound..=upper_bound)
        } else {
            self.problem
                .add_column(objective_coefficient, lower_bound..=upper_bound)
        };
        self.columns.push(col);
        self.columns.len() - 1
    }

    /// Add a range row `lower <= sum(coefficients[k] * x[columns[k]]) <= upper`.
    ///
    /// # Errors
    ///
    /// Returns an error if columns and coefficients have different lengths
    /// or if any column index is out of bounds.
    pub fn add_row(
        &mut self,
        lower_bound: f64,
        upper_bound: f64,
        columns: &[u32],
        coefficients: &[f64],
    ) -> Result<usize, HighsModelError> {
        if columns.len() != coefficients.len() {
            warn!(
                component = "solver",
                operation = "add_row",
                status = "error",
                columns = columns.len(),
                coefficients = coefficients.len(),
                "Column/coefficients length mismatch"
            );
            return Err(HighsModelError::ColumnCoefficientLengthMismatch {
                columns: columns.len(),
                coefficients: coefficients.len(),
            });
        }
        self.solved = None;
        let num_columns = self.columns.len();
        let mut factors = Vec::with_capacity(columns.len());
        for (&column_index, &coefficient) in columns.iter().zip(coefficients) {
            let col = *self.columns.get(column_index as usize).ok_or(
                HighsModelError::ColumnIndexOutOfBounds {
                    column_index,
                    num_columns,
                },
            )?;
            factors.push((col, coefficient));
        }
        self.problem.add_row(lower_bound..=upper_bound, factors);
        Ok(self.problem.num_rows().saturating_sub(1))
    }

    /// Enable or disable logging to console for the next solve.
    pub fn set_log_to_console(&mut self, enabled: bool) {
        self.log_to_console = enabled;
    }

    /// Set a HiGHS option for the next solve.
    pub fn set_option(&mut self, option: impl Into<String>, value: HighsOption) {
        self.options.push((option.into(), value));
    }

    /// Set verbosity level for the next solve.
    pub fn set_verbosity(&mut self, level: u32) {
        self.verbosity = Some(level);
    }

    /// Set a full primal start, forwarded to HiGHS as an initial solution.
    ///
    /// # Errors
    ///
    /// Returns an error if the vector length does not match the column count.
    pub fn set_primal_start(&mut self, cols: Vec<f64>) -> Result<(), HighsModelError> {
        if cols.len() != self.columns.len() {
            return Err(HighsModelError::PrimalStartLengthMismatch {
                expected: self.columns.len(),
                got: cols.len(),
            });
        }
        self.primal_start = Some(cols);
        Ok(())
    }

    /// Maximize the model.
    ///
    /// The built problem is consumed; a further solve needs the columns and
    /// rows added again.
    ///
    /// # Errors
    ///
    /// Returns an error if HiGHS rejects the problem or an option, or if the
    /// run itself fails. The wrapper is reset either way.
    pub fn solve(&mut self) -> Result<HighsStatus, HighsModelError> {
        debug!(
            num_cols = self.problem.num_cols(),
            num_rows = self.problem.num_rows(),
            component = "solver",
            operation = "solve",
            status = "start",
            "Solving model"
        );

        let problem = std::mem::take(&mut self.problem);
        let options = std::mem::take(&mut self.options);
        let verbosity = self.verbosity.take();
        let primal_start = self.primal_start.take();
        self.columns.clear();
        self.solved = None;

        let solved = self
            .prepare(problem, options, verbosity, primal_start)
            .and_then(|model| {
                model
                    .try_solve()
                    .map_err(|status| HighsModelError::SolveFailed { status })
            })
            .inspect_err(|err| {
                warn!(
                    component = "solver",
                    operation = "solve",
                    status = "error",
                    %err,
                    "HiGHS solve failed"
                );
            })?;
        let status = map_status(solved.status());
        trace!(
            component = "solver",
            operation = "solve",
            status = "success",
            ?status,
            "Solution status received"
        );
        self.solved = Some(solved);
        Ok(status)
    }

    fn prepare(
        &self,
        problem: RowProblem,
        options: Vec<(String, HighsOption)>,
        verbosity: Option<u32>,
        primal_start: Option<Vec<f64>>,
    ) -> Result<Model, HighsModelError> {
        let mut model = problem
            .try_optimise(Sense::Maximise)
            .map_err(|status| HighsModelError::ProblemRejected { status })?;
        if let Some(level) = verbosity {
            apply_option(&mut model, "output_flag", &HighsOption::Bool(level > 0))?;
        }
        for (option, value) in &options {
            apply_option(&mut model, option, value)?;
        }
        if self.log_to_console {
            apply_option(&mut model, "log_to_console", &HighsOption::Bool(true))?;
            apply_option(&mut model, "output_flag", &HighsOption::Bool(true))?;
        }
        if let Some(cols) = primal_start {
            if let Err(err) = model.try_set_solution(Some(&cols), None, None, None) {
                warn!(
                    component = "solver",
                    operation = "set_primal_start",
                    status = "warn",
                    ?err,
                    "HiGHS rejected the start point; continuing without it"
                );
            }
        }
        Ok(model)
    }

    /// Number of columns added since the last solve.
    pub fn columns(&self) -> usize {
        self.columns.len()
    }

    /// Objective value of the current solution.
    ///
    /// # Errors
    ///
    /// Returns an error if the model has not been solved yet.
    pub fn objective_value(&self) -> Result<f64, HighsModelError> {
        let solved = self.solved.as_ref().ok_or(HighsModelError::SolveRequired {
            operation: "objective_value",
        })?;
        Ok(solved.objective_value())
    }

    /// MIP gap of the latest solve, `NaN` before solving.
    pub fn mip_gap(&self) -> f64 {
        match self.solved.as_ref() {
            Some(solved) => solved.mip_gap(),
            None => f64::NAN,
        }
    }

    /// Whether the latest solve produced a feasible primal point.
    pub fn has_feasible_primal(&self) -> bool {
        self.get_int_info("primal_solution_status") == Some(PRIMAL_SOLUTION_FEASIBLE)
    }

    /// Simplex iterations of the latest solve.
    pub fn simplex_iteration_count(&self) -> u64 {
        self.get_int_info("simplex_iteration_count")
            .and_then(|value| u64::try_from(value).ok())
            .unwrap_or(0)
    }

    fn get_int_info(&self, name: &str) -> Option<i64> {
        let solved = self.solved.as_ref()?;
        let c_name = CString::new(name).ok()?;
        let mut value: highs_sys::HighsInt = 0;
        let status = unsafe {
            highs_sys::Highs_getIntInfoValue(solved.as_ptr(), c_name.as_ptr(), &raw mut value)
        };
        if status == highs_sys::STATUS_OK {
            Some(i64::from(value))
        } else {
            debug!(
                component = "solver",
                operation = "solve_info",
                info = name,
                status_code = status,
                "Info value not available"
            );
            None
        }
    }

    /// Primal values of the latest solve.
    ///
    /// # Errors
    ///
    /// Returns an error if the model has not been solved yet.
    pub fn solution_snapshot(&self) -> Result<SolutionSnapshot, HighsModelError> {
        let solved = self.solved.as_ref().ok_or(HighsModelError::SolveRequired {
            operation: "solution_snapshot",
        })?;
        let solution = solved.get_solution();
        Ok(SolutionSnapshot {
            col_values: solution.columns().to_vec(),
            row_values: solution.rows().to_vec(),
        })
    }
}

impl Default for HighsModel {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HighsModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let objective_value = self.solved.as_ref().map(|s| s.objective_value());
        f.debug_struct("HighsModel")
            .field("num_columns", &self.problem.num_cols())
            .field("num_rows", &self.problem.num_rows())
            .field("objective_value", &objective_value)
            .finish_non_exhaustive()
    }
}

/// Return the HiGHS solver version string, if available.
pub fn highs_version() -> Option<String> {
    unsafe {
        let ptr = highs_sys::Highs_version();
        if ptr.is_null() {
            None
        } else {
            CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
        }
    }
}

/// HiGHS's representation of an unbounded value.
///
/// Queried from a scratch HiGHS instance on first use and reused for the rest
/// of the process.
pub fn highs_infinity() -> f64 {
    static INFINITY: OnceLock<f64> = OnceLock::new();
    *INFINITY.get_or_init(|| {
        let value = unsafe {
            let highs = highs_sys::Highs_create();
            if highs.is_null() {
                f64::INFINITY
            } else {
                let value = highs_sys::Highs_getInfinity(highs);
                highs_sys::Highs_destroy(highs);
                value
            }
        };
        debug!(
            component = "solver",
            operation = "get_infinity",
            status = "success",
            value,
            "Queried HiGHS infinity"
        );
        value
    })
}

/// Set one option, treating an error status from HiGHS as a rejected value.
fn apply_option(
    model: &mut Model,
    option: &str,
    value: &HighsOption,
) -> Result<(), HighsModelError> {
    let rejected = || HighsModelError::OptionRejected {
        option: option.to_string(),
    };
    let c_option = CString::new(option).map_err(|_| rejected())?;
    let highs: *mut c_void = model.as_mut_ptr();
    let name: *const c_char = c_option.as_ptr();
    let status = match value {
        HighsOption::Bool(val) => unsafe {
            highs_sys::Highs_setBoolOptionValue(highs, name, highs_sys::HighsInt::from(*val))
        },
        HighsOption::Int(val) => unsafe { highs_sys::Highs_setIntOptionValue(highs, name, *val) },
        HighsOption::Float(val) => unsafe {
            highs_sys::Highs_setDoubleOptionValue(highs, name, *val)
        },
        HighsOption::Str(val) => {
            let c_value = CString::new(val.as_str()).map_err(|_| rejected())?;
            unsafe { highs_sys::Highs_setStringOptionValue(highs, name, c_value.as_ptr()) }
        }
    };
    if status == highs_sys::STATUS_ERROR {
        return Err(rejected());
    }
    Ok(())
}

fn map_status(status: HighsModelStatus) -> HighsStatus {
    match status {
        HighsModelStatus::Optimal => HighsStatus::Optimal,
        HighsModelStatus::Infeasible => HighsStatus::Infeasible,
        HighsModelStatus::Unbounded => HighsStatus::Unbounded,
        HighsModelStatus::UnboundedOrInfeasible => HighsStatus::UnboundedOrInfeasible,
        HighsModelStatus::ReachedTimeLimit => HighsStatus::ReachedTimeLimit,
        HighsModelStatus::ReachedIterationLimit => HighsStatus::ReachedIterationLimit,
        HighsModelStatus::ModelEmpty => HighsStatus::ModelEmpty,
        _ => HighsStatus::Unknown,
    }
}
