//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `fmt` subscriber filtered by `RUST_LOG`.
//!
//! ```bash
//! # Order flow and breaker transitions
//! RUST_LOG=info cargo run
//!
//! # Also every actor request and guarded call
//! RUST_LOG=debug cargo run
//!
//! # Only breaker activity
//! RUST_LOG=resilience=debug cargo run
//! ```
//!
//! Orchestrator entry points carry `#[instrument]` spans, so a failed validation is
//! logged inside the span of the operation that triggered it:
//!
//! ```text
//! INFO create_order{user_id=user_1 items=2}: Order created order_id=order_1 total=45.0
//! WARN create_order{user_id=user_1 items=1}:validate_product_exists{dependency=product-service id=ProductId(3)}: ...
//! WARN event="circuit_breaker_state_change" name=product-service from=closed to=open
//! ```
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
