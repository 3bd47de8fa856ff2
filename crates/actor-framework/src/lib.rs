//! # Actor Framework
//!
//! Generic building blocks for stores that keep their state inside a single Tokio task.
//! A [`ResourceActor`] owns a collection of entities and applies one request at a time,
//! so every request is atomic with respect to every other request without any lock
//! around the collection.
//!
//! ## Architecture Overview
//!
//! The framework separates concerns into three layers:
//!
//! 1. **Entity Layer** ([`ActorEntity`]) - the domain type, its DTOs, hooks and filters
//! 2. **Runtime Layer** ([`ResourceActor`]) - the message loop and the in-memory store
//! 3. **Interface Layer** ([`ResourceClient`]) - the cloneable, type-safe handle
//!
//! ## Requests
//!
//! Every actor understands the same small set of requests:
//!
//! | Request  | Effect |
//! |----------|--------|
//! | `Create` | allocate the next id, build the entity, run `on_create`, insert, reply with it |
//! | `Get`    | clone the entity out, `None` when absent |
//! | `Update` | run `on_update` against the stored entity |
//! | `Action` | run `handle_action` against the stored entity |
//! | `List`   | filter, order by id descending, paginate, report the unpaged count |
//!
//! A hook that fails leaves the store exactly as it was before the request.
//!
//! ## Context Injection
//!
//! Dependencies are injected when the actor starts (`run(context)`), not when it is
//! built. The order store uses this to share an item-id sequence with its entities:
//!
//! ```rust
//! use actor_framework::{ActorEntity, ResourceActor};
//! use async_trait::async_trait;
//!
//! #[derive(Clone, Debug)]
//! struct Counter { id: u32, value: u64 }
//! #[derive(Debug)] struct CounterCreate { start: u64 }
//! #[derive(Debug)] enum CounterAction { Add(u64) }
//! #[derive(Debug, thiserror::Error)] #[error("counter error")] struct CounterError;
//!
//! #[async_trait]
//! impl ActorEntity for Counter {
//!     type Id = u32;
//!     type Create = CounterCreate;
//!     type Update = ();
//!     type Action = CounterAction;
//!     type ActionResult = u64;
//!     type Context = ();
//!     type Filter = ();
//!     type Error = CounterError;
//!
//!     fn from_create_params(id: u32, params: CounterCreate) -> Result<Self, Self::Error> {
//!         Ok(Self { id, value: params.start })
//!     }
//!     async fn on_update(&mut self, _: (), _: &()) -> Result<(), Self::Error> { Ok(()) }
//!     async fn handle_action(&mut self, action: CounterAction, _: &()) -> Result<u64, Self::Error> {
//!         match action {
//!             CounterAction::Add(n) => { self.value += n; Ok(self.value) }
//!         }
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let (actor, client) = ResourceActor::<Counter>::new(10);
//!     tokio::spawn(actor.run(()));
//!
//!     let id = client.create(CounterCreate { start: 1 }).await.unwrap().id;
//!     let value = client.perform_action(id, CounterAction::Add(2)).await.unwrap();
//!     assert_eq!(value, 3);
//! }
//! ```
//!
//! ## Testing
//!
//! [`mock::MockClient`] answers requests from a queue of expectations instead of a
//! running actor, which makes failure paths (closed actors, dropped responses) trivial
//! to reproduce.

pub mod actor;
pub mod client;
pub mod client_trait;
pub mod entity;
pub mod error;
pub mod message;
pub mod mock;

pub use actor::ResourceActor;
pub use client::ResourceClient;
pub use client_trait::ActorClient;
pub use entity::ActorEntity;
pub use error::FrameworkError;
pub use message::{Listing, Page, ResourceRequest, Response};
