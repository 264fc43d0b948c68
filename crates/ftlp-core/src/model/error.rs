//! Model error types.

use crate::error::ErrorKind;

/// Errors that can occur while building a model.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// A size passed across the handle boundary was negative.
    NegativeDimension { what: &'static str, value: i64 },
    /// More columns than the capability's index width allows.
    TooManyColumns { requested: usize, max: usize },
    /// An array does not have the length the model requires.
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },
    /// Column bounds with `lower > upper` or NaN.
    InvalidColumnBounds { column: usize, lower: f64, upper: f64 },
    /// Row bounds with `lower > upper` or NaN.
    InvalidRowBounds { lower: f64, upper: f64 },
    /// A non-finite objective or row coefficient.
    InvalidCoefficient { position: usize, coefficient: f64 },
    /// A sparse index outside `[0, num_columns)`.
    ColumnIndexOutOfRange { index: i64, num_columns: usize },
    /// The same column appears twice in one sparse row.
    DuplicateColumnIndex { column: usize },
    /// CSR offsets inconsistent with the batch buffers.
    MalformedBatch { reason: String },
}

impl ModelError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            ModelError::NegativeDimension { .. } => "MODEL_NEGATIVE_DIMENSION",
            ModelError::TooManyColumns { .. } => "MODEL_TOO_MANY_COLUMNS",
            ModelError::DimensionMismatch { .. } => "MODEL_DIMENSION_MISMATCH",
            ModelError::InvalidColumnBounds { .. } => "COLUMN_INVALID_BOUNDS",
            ModelError::InvalidRowBounds { .. } => "ROW_INVALID_BOUNDS",
            ModelError::InvalidCoefficient { .. } => "COEFFICIENT_NOT_FINITE",
            ModelError::ColumnIndexOutOfRange { .. } => "ROW_INDEX_OUT_OF_RANGE",
            ModelError::DuplicateColumnIndex { .. } => "ROW_DUPLICATE_INDEX",
            ModelError::MalformedBatch { .. } => "BATCH_MALFORMED",
        }
    }

    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ModelError::NegativeDimension { .. }
            | ModelError::TooManyColumns { .. }
            | ModelError::InvalidColumnBounds { .. }
            | ModelError::InvalidRowBounds { .. }
            | ModelError::InvalidCoefficient { .. }
            | ModelError::DuplicateColumnIndex { .. } => ErrorKind::InvalidArgument,
            ModelError::DimensionMismatch { .. } => ErrorKind::DimensionMismatch,
            ModelError::ColumnIndexOutOfRange { .. } => ErrorKind::IndexOutOfRange,
            ModelError::MalformedBatch { .. } => ErrorKind::MalformedBatch,
        }
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        ModelError::MalformedBatch {
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::NegativeDimension { what, value } => {
                write!(f, "[{}] {} must not be negative (got {})", self.code(), what, value)
            }
            ModelError::TooManyColumns { requested, max } => write!(
                f,
                "[{}] Model cannot have {} columns (max {})",
                self.code(),
                requested,
                max
            ),
            ModelError::DimensionMismatch {
                what,
                expected,
                got,
            } => write!(
                f,
                "[{}] {} length mismatch (expected {}, got {})",
                self.code(),
                what,
                expected,
                got
            ),
            ModelError::InvalidColumnBounds {
                column,
                lower,
                upper,
            } => write!(
                f,
                "[{}] Column {} bounds invalid: lower ({}) > upper ({})",
                self.code(),
                column,
                lower,
                upper
            ),
            ModelError::InvalidRowBounds { lower, upper } => write!(
                f,
                "[{}] Row bounds invalid: lower ({}) > upper ({})",
                self.code(),
                lower,
                upper
            ),
            ModelError::InvalidCoefficient {
                position,
                coefficient,
            } => write!(
                f,
                "[{}] Coefficient at position {} must be finite (got {})",
                self.code(),
                position,
                coefficient
            ),
            ModelError::ColumnIndexOutOfRange { index, num_columns } => write!(
                f,
                "[{}] Column index {} out of range (num_columns = {})",
                self.code(),
                index,
                num_columns
            ),
            ModelError::DuplicateColumnIndex { column } => write!(
                f,
                "[{}] Column {} appears more than once in the row",
                self.code(),
                column
            ),
            ModelError::MalformedBatch { reason } => {
                write!(f, "[{}] Row batch malformed: {}", self.code(), reason)
            }
        }
    }
}

impl std::error::Error for ModelError {}
