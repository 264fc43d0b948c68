//! Errors returned through the handle API.

use ftlp_core::{ErrorKind, ModelError, SessionError};

use crate::registry::Handle;

/// Errors returned by [`SessionRegistry`](crate::SessionRegistry) and the
/// [`api`](crate::api) functions.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// The session rejected the call.
    Session(SessionError),
    /// The handle was never issued by this registry.
    UnknownHandle { handle: Handle },
    /// The handle was issued and later disposed.
    DisposedHandle {
        handle: Handle,
        operation: &'static str,
    },
    /// Every handle value has been issued.
    HandlesExhausted,
}

impl ApiError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Session(err) => err.code(),
            ApiError::UnknownHandle { .. } => "HANDLE_UNKNOWN",
            ApiError::DisposedHandle { .. } => "HANDLE_DISPOSED",
            ApiError::HandlesExhausted => "HANDLE_EXHAUSTED",
        }
    }

    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Session(err) => err.kind(),
            ApiError::UnknownHandle { .. } => ErrorKind::InvalidArgument,
            ApiError::DisposedHandle { .. } => ErrorKind::UseAfterDispose,
            ApiError::HandlesExhausted => ErrorKind::InvalidState,
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Session(err) => write!(f, "{err}"),
            ApiError::UnknownHandle { handle } => {
                write!(f, "[{}] Handle {} was never issued", self.code(), handle)
            }
            ApiError::DisposedHandle { handle, operation } => write!(
                f,
                "[{}] Cannot {} through disposed handle {}",
                self.code(),
                operation,
                handle
            ),
            ApiError::HandlesExhausted => {
                write!(f, "[{}] No more session handles can be issued", self.code())
            }
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Session(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        ApiError::Session(err)
    }
}

impl From<ModelError> for ApiError {
    fn from(err: ModelError) -> Self {
        ApiError::Session(SessionError::Model(err))
    }
}
