//! # Guarded Caller
//!
//! Runs one outbound call under a timeout and a breaker, and reports which of the
//! three things happened.

use crate::breaker::{CircuitBreaker, Rejection};
use crate::classifier::{FailureClassifier, StatusClassifier};
use crate::error::{RemoteError, StatusCode};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Result of a guarded call.
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome<T> {
    Success(T),
    /// The call was attempted and the dependency (or the timeout) produced an error.
    RemoteFailure(RemoteError),
    /// The call was never attempted.
    BreakerRejected(Rejection),
}

impl<T> CallOutcome<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> CallOutcome<U> {
        match self {
            CallOutcome::Success(value) => CallOutcome::Success(f(value)),
            CallOutcome::RemoteFailure(e) => CallOutcome::RemoteFailure(e),
            CallOutcome::BreakerRejected(r) => CallOutcome::BreakerRejected(r),
        }
    }
}

/// Applies a timeout, a breaker and a classifier to calls against one dependency.
#[derive(Clone)]
pub struct GuardedCaller {
    breaker: Arc<CircuitBreaker>,
    classifier: Arc<dyn FailureClassifier>,
    timeout: Duration,
}

impl GuardedCaller {
    /// Uses the default [`StatusClassifier`].
    pub fn new(breaker: Arc<CircuitBreaker>, timeout: Duration) -> Self {
        Self {
            breaker,
            classifier: Arc::new(StatusClassifier::default()),
            timeout,
        }
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn FailureClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn breaker(&self) -> &Arc<CircuitBreaker> {
        &self.breaker
    }

    /// Whether `error` is charged to the dependency's health.
    pub fn counts_as_failure(&self, error: &RemoteError) -> bool {
        self.classifier.is_failure(error)
    }

    /// Runs `call` if the breaker admits it.
    ///
    /// A timeout counts as `DeadlineExceeded`. Dropping the returned future before it
    /// completes abandons the call without recording a result.
    pub async fn call<T, F, Fut>(&self, call: F) -> CallOutcome<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, RemoteError>>,
    {
        let ticket = match self.breaker.try_acquire() {
            Ok(ticket) => ticket,
            Err(rejection) => return CallOutcome::BreakerRejected(rejection),
        };

        let result = match tokio::time::timeout(self.timeout, call()).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    breaker = %self.breaker.name(),
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Call timed out"
                );
                Err(RemoteError::status(
                    StatusCode::DeadlineExceeded,
                    format!("no answer within {:?}", self.timeout),
                ))
            }
        };

        match result {
            Ok(value) => {
                ticket.success();
                CallOutcome::Success(value)
            }
            Err(error) => {
                let counted = self.counts_as_failure(&error);
                debug!(breaker = %self.breaker.name(), %error, counted, "Call failed");
                ticket.record(!counted);
                CallOutcome::RemoteFailure(error)
            }
        }
    }
}
