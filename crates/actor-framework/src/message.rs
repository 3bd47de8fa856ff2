//! # Generic Messages
//!
//! Requests exchanged between a `ResourceClient` and its `ResourceActor`, and the
//! pagination types used by `List`.

use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by actors.
pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// Offset pagination window. Page numbers start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: u32,
    pub per_page: u32,
}

impl Page {
    pub fn new(number: u32, per_page: u32) -> Self {
        Self { number, per_page }
    }

    /// Number of matching entities skipped before this page.
    pub fn offset(&self) -> usize {
        (self.number.saturating_sub(1) as usize).saturating_mul(self.per_page as usize)
    }

    pub fn limit(&self) -> usize {
        self.per_page as usize
    }
}

/// One page of a listing plus the number of entities matching the filter.
#[derive(Debug, Clone)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub total: usize,
}

/// Internal message type sent to the actor to request operations.
///
/// The variants cover the lifecycle operations every resource shares (create, read,
/// update, list) plus an `Action` escape hatch for resource-specific logic. The payload
/// types come from the [`ActorEntity`] associated types, so a `User` payload cannot be
/// sent to a `Product` actor.
#[derive(Debug)]
pub enum ResourceRequest<T: ActorEntity> {
    /// Answers with the entity as stored.
    Create {
        params: T::Create,
        respond_to: Response<T>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    Update {
        id: T::Id,
        update: T::Update,
        respond_to: Response<T>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult>,
    },
    List {
        filter: T::Filter,
        page: Page,
        respond_to: Response<Listing<T>>,
    },
}
