//! # Entity Validators
//!
//! One validator per remote dependency, each a [`GuardedCaller`](resilience::GuardedCaller)
//! bound to that dependency's breaker. Validators do not retry and do not interpret
//! failures: the [`CallOutcome`](resilience::CallOutcome) reaches the caller unchanged,
//! and the caller asks the guard's classifier what a failure means.

mod product;
mod user;

pub use product::ProductValidator;
pub use user::UserValidator;
