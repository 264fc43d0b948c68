/// Lower/upper bounds of a column or a row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub lower: f64,
    pub upper: f64,
}

impl Bounds {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// `lower <= upper`, neither side is NaN, and the range admits a finite
    /// value (`lower != +inf`, `upper != -inf`).
    pub fn is_valid(self) -> bool {
        !self.lower.is_nan()
            && !self.upper.is_nan()
            && self.lower <= self.upper
            && self.lower != f64::INFINITY
            && self.upper != f64::NEG_INFINITY
    }

    pub fn contains(self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }
}

/// A decision column with bounds and integrality.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Column {
    pub bounds: Bounds,
    pub is_integer: bool,
}

impl Column {
    /// A continuous column in `[0, +inf)`.
    pub fn non_negative() -> Self {
        Self {
            bounds: Bounds::new(0.0, f64::INFINITY),
            is_integer: false,
        }
    }
}

impl Default for Column {
    fn default() -> Self {
        Self::non_negative()
    }
}

/// An integer type usable as a column index or a CSR offset.
///
/// Callers at the handle boundary pass `i32` (which may be negative and must
/// then be rejected), Rust callers usually pass `usize`. Accepting both avoids
/// converting whole index buffers before validation.
pub trait ColumnIndex: Copy {
    /// The index widened to `i64`, used for signatures and diagnostics.
    fn raw(self) -> i64;

    /// The index as a position, or `None` if it is negative.
    fn to_position(self) -> Option<usize> {
        usize::try_from(self.raw()).ok()
    }
}

impl ColumnIndex for i32 {
    fn raw(self) -> i64 {
        i64::from(self)
    }
}

impl ColumnIndex for i64 {
    fn raw(self) -> i64 {
        self
    }
}

impl ColumnIndex for u32 {
    fn raw(self) -> i64 {
        i64::from(self)
    }
}

impl ColumnIndex for usize {
    fn raw(self) -> i64 {
        i64::try_from(self).unwrap_or(i64::MAX)
    }
}
