//! # Remote Errors
//!
//! What a remote dependency can answer with, independent of any wire format.

use std::fmt;

/// Status codes a remote dependency can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    Cancelled,
    Unknown,
    InvalidArgument,
    DeadlineExceeded,
    NotFound,
    AlreadyExists,
    PermissionDenied,
    ResourceExhausted,
    FailedPrecondition,
    Internal,
    Unavailable,
    Unauthenticated,
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatusCode::Cancelled => "cancelled",
            StatusCode::Unknown => "unknown",
            StatusCode::InvalidArgument => "invalid_argument",
            StatusCode::DeadlineExceeded => "deadline_exceeded",
            StatusCode::NotFound => "not_found",
            StatusCode::AlreadyExists => "already_exists",
            StatusCode::PermissionDenied => "permission_denied",
            StatusCode::ResourceExhausted => "resource_exhausted",
            StatusCode::FailedPrecondition => "failed_precondition",
            StatusCode::Internal => "internal",
            StatusCode::Unavailable => "unavailable",
            StatusCode::Unauthenticated => "unauthenticated",
        };
        f.write_str(name)
    }
}

/// Error returned by a call to a remote dependency.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RemoteError {
    /// The dependency answered with a well-formed status.
    #[error("{code}: {message}")]
    Status { code: StatusCode, message: String },
    /// The call failed without a status (connection reset, decode failure, ...).
    #[error("transport error: {0}")]
    Transport(String),
}

impl RemoteError {
    pub fn status(code: StatusCode, message: impl Into<String>) -> Self {
        RemoteError::Status {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::status(StatusCode::NotFound, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::status(StatusCode::Unavailable, message)
    }

    /// The status code, or `None` for transport errors.
    pub fn code(&self) -> Option<StatusCode> {
        match self {
            RemoteError::Status { code, .. } => Some(*code),
            RemoteError::Transport(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.code() == Some(StatusCode::NotFound)
    }
}
