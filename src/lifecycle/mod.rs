//! Runtime wiring and lifecycle management.
//!
//! - [`OrderSystem`] - starts the actors, builds the breakers, validators and the
//!   orchestrator, and shuts everything down
//! - [`setup_tracing`] - initializes the tracing/logging infrastructure

pub mod order_system;
pub mod tracing;

pub use order_system::*;
pub use self::tracing::setup_tracing;
