//! Errors returned by the order orchestrator.

use crate::order_actor::StoreError;
use resilience::{Rejection, RemoteError};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    /// The request is malformed; nothing was called.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A referenced user or product does not exist.
    #[error("Validation failed: {0}")]
    ValidationFailure(String),

    /// A dependency was called and failed for infrastructure reasons.
    #[error("Dependency {dependency} unavailable: {source}")]
    DependencyUnavailable {
        dependency: String,
        source: RemoteError,
    },

    /// The dependency's breaker rejected the call before it was attempted.
    #[error("Circuit breaker for {dependency} rejected the call: {rejection}")]
    BreakerOpen {
        dependency: String,
        rejection: Rejection,
    },

    /// The order or order item does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    /// Validation did not finish within the request deadline. Nothing was stored.
    #[error("Request deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),
}

impl OrderError {
    /// Whether the same request may succeed later without changes.
    ///
    /// Remote failures the guard's classifier counts against a dependency are
    /// retryable. Remote failures it does not count are `ValidationFailure` and are not.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            OrderError::DependencyUnavailable { .. }
                | OrderError::BreakerOpen { .. }
                | OrderError::DeadlineExceeded(_)
        )
    }
}

impl From<StoreError> for OrderError {
    fn from(e: StoreError) -> Self {
        if e.is_not_found() {
            OrderError::NotFound(e.to_string())
        } else {
            OrderError::Storage(e.to_string())
        }
    }
}
