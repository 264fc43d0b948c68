//! Solver configuration types.

/// Options applied to one solve.
///
/// Every field is optional; `None` leaves the backend default in place. A
/// session starts from the registry's default configuration and may adjust its
/// own copy while it is still being built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolverConfig {
    /// Wall-clock limit in seconds. `None` means unlimited.
    pub time_limit: Option<f64>,
    /// Relative MIP gap at which branch-and-bound stops.
    pub mip_gap: Option<f64>,
    /// Engine verbosity; `0` keeps the engine quiet.
    pub verbosity: Option<u32>,
    /// Enable/disable presolve.
    pub presolve: Option<bool>,
    /// Number of engine threads.
    pub threads: Option<u32>,
    /// Primal and dual feasibility tolerance.
    pub tolerance: Option<f64>,
    /// Forward engine output to the console.
    pub log_to_console: Option<bool>,
}

impl SolverConfig {
    /// Create a configuration with all defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the time limit in seconds. A non-finite limit clears it.
    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.time_limit = seconds.is_finite().then_some(seconds);
        self
    }

    /// Remove any time limit.
    pub fn without_time_limit(mut self) -> Self {
        self.time_limit = None;
        self
    }

    /// Set the relative MIP gap.
    pub fn with_mip_gap(mut self, gap: f64) -> Self {
        self.mip_gap = Some(gap);
        self
    }

    /// Set the verbosity level.
    pub fn with_verbosity(mut self, level: u32) -> Self {
        self.verbosity = Some(level);
        self
    }

    /// Enable or disable presolve.
    pub fn with_presolve(mut self, enabled: bool) -> Self {
        self.presolve = Some(enabled);
        self
    }

    /// Set the number of threads.
    pub fn with_threads(mut self, count: u32) -> Self {
        self.threads = Some(count);
        self
    }

    /// Set the feasibility tolerance.
    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = Some(tol);
        self
    }

    /// Enable or disable console logging.
    pub fn with_log_to_console(mut self, enabled: bool) -> Self {
        self.log_to_console = Some(enabled);
        self
    }

    /// Check if this configuration leaves everything at the backend default.
    pub fn is_empty(&self) -> bool {
        self.time_limit.is_none()
            && self.mip_gap.is_none()
            && self.verbosity.is_none()
            && self.presolve.is_none()
            && self.threads.is_none()
            && self.tolerance.is_none()
            && self.log_to_console.is_none()
    }
}
