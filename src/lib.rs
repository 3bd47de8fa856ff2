//! # Order Orchestrator
//!
//! Creates and manages orders that reference users and products owned by other
//! services. Every call to those services goes through a per-dependency circuit
//! breaker, so a failing dependency is cut off quickly and bad input is never
//! mistaken for an unhealthy service.
//!
//! ## Layers
//!
//! ### 1. Storage ([`order_actor`], [`user_actor`], [`product_actor`])
//! Each runs as a `ResourceActor` from the `actor_framework` crate, processing one
//! request at a time. The order actor is the order store; the user and product actors
//! stand in for the remote services.
//!
//! ### 2. Seams ([`clients`])
//! Typed clients over the actors, and the traits the orchestrator depends on:
//! [`UserDirectory`](clients::UserDirectory), [`ProductCatalog`](clients::ProductCatalog)
//! and [`OrderStore`](clients::OrderStore).
//!
//! ### 3. Resilience ([`validators`])
//! One validator per dependency, each a `GuardedCaller` from the `resilience` crate
//! (timeout, breaker, failure classification).
//!
//! ### 4. Business logic ([`orchestrator`])
//! [`OrderOrchestrator`](orchestrator::OrderOrchestrator): validation, pricing, totals,
//! item mutations and status updates.
//!
//! ### 5. Wiring ([`lifecycle`], [`config`])
//! [`OrderSystem`](lifecycle::OrderSystem) builds all of the above from an
//! [`OrchestratorConfig`](config::OrchestratorConfig).
//!
//! ## Running the Demo
//!
//! ```bash
//! RUST_LOG=info cargo run
//! ```

pub mod clients;
pub mod config;
pub mod lifecycle;
pub mod model;
pub mod orchestrator;
pub mod order_actor;
pub mod product_actor;
pub mod user_actor;
pub mod validators;
