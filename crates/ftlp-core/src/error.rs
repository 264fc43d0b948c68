//! Error taxonomy shared by the model, session and handle layers.

/// Category of a rejected call.
///
/// Argument categories are always detected before any state is touched; the
/// model is unchanged when one of them is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad bounds, bad coefficients, duplicate indices, negative sizes, unknown handles.
    InvalidArgument,
    /// An array has the wrong length.
    DimensionMismatch,
    /// A sparse index lies outside `[0, num_columns)`.
    IndexOutOfRange,
    /// CSR offsets of a batch are inconsistent with its buffers.
    MalformedBatch,
    /// The call is not allowed in the session's current lifecycle state.
    InvalidState,
    /// The session (or handle) was disposed.
    UseAfterDispose,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::DimensionMismatch => "dimension_mismatch",
            ErrorKind::IndexOutOfRange => "index_out_of_range",
            ErrorKind::MalformedBatch => "malformed_batch",
            ErrorKind::InvalidState => "invalid_state",
            ErrorKind::UseAfterDispose => "use_after_dispose",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
