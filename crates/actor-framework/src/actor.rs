//! # Generic Actor Server
//!
//! The `ResourceActor` owns the entities of one resource type and processes requests
//! sequentially inside its own task, which gives each request all-or-nothing semantics
//! without locks.

use crate::client::ResourceClient;
use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use crate::message::{Listing, Page, ResourceRequest};
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// The generic actor that manages a collection of entities.
///
/// # Usage Pattern
///
/// 1.  **Create**: `ResourceActor::new()` returns the actor (server) and its client.
/// 2.  **Wire**: pass dependencies into `actor.run(context)`.
/// 3.  **Run**: spawn the run loop in a background task.
///
/// # Atomicity
///
/// * **Create** builds the entity, runs `on_create`, and only then inserts it. The
///   reply carries the stored entity, so callers never need a follow-up `Get`. A failed
///   hook leaves nothing behind, although the allocated id is not reused.
/// * **Update** and **Action** run their hook against a clone and store the clone only
///   when the hook succeeds.
/// * **List** sees the store between two requests, never in the middle of one.
pub struct ResourceActor<T: ActorEntity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: HashMap<T::Id, T>,
    next_id: u32,
}

impl<T: ActorEntity> ResourceActor<T> {
    /// Creates a new `ResourceActor` and its associated `ResourceClient`.
    ///
    /// `buffer_size` is the mailbox capacity; callers wait when it is full.
    pub fn new(buffer_size: usize) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store: HashMap::new(),
            next_id: 1,
        };
        let client = ResourceClient::new(sender);
        (actor, client)
    }

    /// Runs the actor's event loop until every client has been dropped.
    pub async fn run(mut self, context: T::Context) {
        let entity_type = std::any::type_name::<T>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        info!(entity_type, "Actor started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { params, respond_to } => {
                    debug!(entity_type, ?params, "Create");
                    let id = T::Id::from(self.next_id);
                    self.next_id += 1;

                    let result = self.create(id.clone(), params, &context).await;
                    match &result {
                        Ok(_) => info!(entity_type, %id, size = self.store.len(), "Created"),
                        Err(e) => warn!(entity_type, error = %e, "Create failed"),
                    }
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Get { id, respond_to } => {
                    let item = self.store.get(&id).cloned();
                    debug!(entity_type, %id, found = item.is_some(), "Get");
                    let _ = respond_to.send(Ok(item));
                }
                ResourceRequest::Update {
                    id,
                    update,
                    respond_to,
                } => {
                    debug!(entity_type, %id, ?update, "Update");
                    let result = match self.store.get(&id).cloned() {
                        Some(mut item) => match item.on_update(update, &context).await {
                            Ok(()) => {
                                self.store.insert(id.clone(), item.clone());
                                info!(entity_type, %id, "Updated");
                                Ok(item)
                            }
                            Err(e) => {
                                warn!(entity_type, %id, error = %e, "Update failed");
                                Err(FrameworkError::EntityError(Box::new(e)))
                            }
                        },
                        None => {
                            warn!(entity_type, %id, "Not found");
                            Err(FrameworkError::NotFound(id.to_string()))
                        }
                    };
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Action {
                    id,
                    action,
                    respond_to,
                } => {
                    debug!(entity_type, %id, ?action, "Action");
                    let result = match self.store.get(&id).cloned() {
                        Some(mut item) => match item.handle_action(action, &context).await {
                            Ok(outcome) => {
                                self.store.insert(id.clone(), item);
                                info!(entity_type, %id, "Action ok");
                                Ok(outcome)
                            }
                            Err(e) => {
                                warn!(entity_type, %id, error = %e, "Action failed");
                                Err(FrameworkError::EntityError(Box::new(e)))
                            }
                        },
                        None => {
                            warn!(entity_type, %id, "Not found");
                            Err(FrameworkError::NotFound(id.to_string()))
                        }
                    };
                    let _ = respond_to.send(result);
                }
                ResourceRequest::List {
                    filter,
                    page,
                    respond_to,
                } => {
                    let listing = self.list(&filter, page);
                    debug!(
                        entity_type,
                        ?filter,
                        page = page.number,
                        returned = listing.items.len(),
                        total = listing.total,
                        "List"
                    );
                    let _ = respond_to.send(Ok(listing));
                }
            }
        }

        info!(entity_type, size = self.store.len(), "Shutdown");
    }

    async fn create(
        &mut self,
        id: T::Id,
        params: T::Create,
        context: &T::Context,
    ) -> Result<T, FrameworkError> {
        let mut item = T::from_create_params(id.clone(), params)
            .map_err(|e| FrameworkError::EntityError(Box::new(e)))?;
        item.on_create(context)
            .await
            .map_err(|e| FrameworkError::EntityError(Box::new(e)))?;
        self.store.insert(id, item.clone());
        Ok(item)
    }

    fn list(&self, filter: &T::Filter, page: Page) -> Listing<T> {
        let mut matched: Vec<(&T::Id, &T)> = self
            .store
            .iter()
            .filter(|(_, item)| item.matches(filter))
            .collect();
        matched.sort_by(|a, b| b.0.cmp(a.0));

        let total = matched.len();
        let items = matched
            .into_iter()
            .skip(page.offset())
            .take(page.limit())
            .map(|(_, item)| item.clone())
            .collect();
        Listing { items, total }
    }
}
