//! # Order Actor
//!
//! The order store. Each order is one entity holding its items, so an order and all
//! of its items are created by a single `Create` request and become visible together.
//! Item changes, status and total writes are [`OrderAction`]s, each applied as its own
//! request.
//!
//! ## Context
//!
//! Item ids are unique across orders. The actor owns the [`ItemSequence`] and hands
//! it to every hook through `run(context)`:
//!
//! ```rust
//! use order_orchestrator::order_actor::{self, ItemSequence};
//!
//! #[tokio::main]
//! async fn main() {
//!     let (actor, _client) = order_actor::new();
//!     tokio::spawn(actor.run(ItemSequence::default()));
//! }
//! ```

mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use entity::ItemSequence;
pub use error::*;

use crate::clients::OrderClient;
use crate::model::Order;
use actor_framework::ResourceActor;

/// Creates a new Order actor and its client.
pub fn new() -> (ResourceActor<Order>, OrderClient) {
    let (actor, generic_client) = ResourceActor::new(64);
    (actor, OrderClient::new(generic_client))
}
