//! # ActorEntity Trait
//!
//! The contract every stored resource implements so that a generic [`ResourceActor`]
//! can manage it. Associated types pin down the id, the DTOs, the custom actions, the
//! injected context and the list filter, so a request meant for one resource type can
//! never be sent to another.
//!
//! [`ResourceActor`]: crate::ResourceActor

use async_trait::async_trait;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Trait that any resource entity must implement to be managed by a `ResourceActor`.
///
/// # Hooks
///
/// Hooks run inside the actor task and receive the context passed to `run()`.
/// They operate on a working copy or on the stored value in a way that leaves the
/// store untouched when they return an error:
///
/// - [`ActorEntity::on_create`] runs before the entity is inserted.
/// - [`ActorEntity::on_update`] and [`ActorEntity::handle_action`] run against a clone
///   that replaces the stored value only on success.
#[async_trait]
pub trait ActorEntity: Clone + Send + Sync + 'static {
    /// Unique identifier. Allocated by the actor from a `u32` sequence, ordered so that
    /// listings can be returned newest first.
    type Id: Eq + Ord + Hash + Clone + Send + Sync + Display + Debug + From<u32>;

    /// Payload required to create a new instance.
    type Create: Send + Sync + Debug;

    /// Payload applied by `Update` requests.
    type Update: Send + Sync + Debug;

    /// Resource-specific operations.
    type Action: Send + Sync + Debug;

    /// Result returned by custom actions.
    type ActionResult: Send + Sync + Debug;

    /// Runtime dependencies injected into every hook. Use `()` when none are needed.
    type Context: Send + Sync;

    /// Equality filter accepted by `List` requests. Use `()` when listings are unfiltered.
    type Filter: Send + Sync + Debug;

    /// One error type per entity, shared by all of its hooks.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Build the entity from the allocated id and the creation payload.
    fn from_create_params(id: Self::Id, params: Self::Create) -> Result<Self, Self::Error>;

    /// Called after `from_create_params` and before the entity is stored.
    async fn on_create(&mut self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called when an update request is received.
    async fn on_update(
        &mut self,
        update: Self::Update,
        _ctx: &Self::Context,
    ) -> Result<(), Self::Error>;

    /// Handle a custom resource-specific action.
    async fn handle_action(
        &mut self,
        action: Self::Action,
        _ctx: &Self::Context,
    ) -> Result<Self::ActionResult, Self::Error>;

    /// Whether this entity belongs in a listing restricted by `filter`.
    fn matches(&self, _filter: &Self::Filter) -> bool {
        true
    }
}
