//! # Resilience
//!
//! Protection for calls that cross a network boundary:
//!
//! - [`FailureClassifier`] decides which errors say "the dependency is unhealthy".
//! - [`CircuitBreaker`] stops calling a dependency that keeps failing.
//! - [`BreakerRegistry`] hands out one breaker per dependency name.
//! - [`GuardedCaller`] ties a timeout, a breaker and a classifier together and reports
//!   a [`CallOutcome`].
//!
//! ```rust
//! use resilience::{BreakerRegistry, BreakerSettings, CallOutcome, GuardedCaller, RemoteError};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let registry = BreakerRegistry::new(BreakerSettings::default());
//!     let caller = GuardedCaller::new(registry.breaker("user-service"), Duration::from_secs(3));
//!
//!     let outcome = caller
//!         .call(|| async { Err::<u32, _>(RemoteError::not_found("user 1")) })
//!         .await;
//!     assert!(matches!(outcome, CallOutcome::RemoteFailure(_)));
//! }
//! ```

pub mod breaker;
pub mod classifier;
pub mod error;
pub mod guard;
pub mod listener;
pub mod registry;

pub use breaker::{BreakerSettings, CircuitBreaker, Counts, Rejection, Snapshot, State, Ticket};
pub use classifier::{FailureClassifier, StatusClassifier};
pub use error::{RemoteError, StatusCode};
pub use guard::{CallOutcome, GuardedCaller};
pub use listener::{ChannelListener, LogListener, StateChange, StateChangeListener};
pub use registry::BreakerRegistry;
