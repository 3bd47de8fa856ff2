//! # Failure Classification
//!
//! Decides which remote errors count against a breaker. A dependency that answers
//! "not found" is healthy; one that times out is not.

use crate::error::{RemoteError, StatusCode};
use std::collections::HashSet;

/// Decides whether a remote error counts as a breaker failure.
///
/// Any `Fn(&RemoteError) -> bool` closure is a classifier.
pub trait FailureClassifier: Send + Sync {
    fn is_failure(&self, error: &RemoteError) -> bool;
}

impl<F> FailureClassifier for F
where
    F: Fn(&RemoteError) -> bool + Send + Sync,
{
    fn is_failure(&self, error: &RemoteError) -> bool {
        self(error)
    }
}

/// Table-driven classifier: a status counts as a failure when its code is in the set.
#[derive(Debug, Clone)]
pub struct StatusClassifier {
    failure_codes: HashSet<StatusCode>,
    transport_is_failure: bool,
}

impl StatusClassifier {
    pub fn new(codes: impl IntoIterator<Item = StatusCode>) -> Self {
        Self {
            failure_codes: codes.into_iter().collect(),
            transport_is_failure: true,
        }
    }

    /// Whether errors without a status count as failures. On by default.
    pub fn transport_is_failure(mut self, enabled: bool) -> Self {
        self.transport_is_failure = enabled;
        self
    }
}

impl Default for StatusClassifier {
    /// Unavailable, deadline exceeded, resource exhausted, internal, and every
    /// transport error.
    fn default() -> Self {
        Self::new([
            StatusCode::Unavailable,
            StatusCode::DeadlineExceeded,
            StatusCode::ResourceExhausted,
            StatusCode::Internal,
        ])
    }
}

impl FailureClassifier for StatusClassifier {
    fn is_failure(&self, error: &RemoteError) -> bool {
        match error.code() {
            Some(code) => self.failure_codes.contains(&code),
            None => self.transport_is_failure,
        }
    }
}
