//! # ActorClient Trait
//!
//! Shared surface for resource-specific clients: they expose their inner
//! [`ResourceClient`], say how framework errors become their own error type, and get
//! `get` and `list` for free.
use crate::{ActorEntity, FrameworkError, Listing, Page, ResourceClient};
use async_trait::async_trait;

/// Trait for resource-specific clients to inherit the standard read operations.
///
/// # Example
///
/// ```rust
/// use actor_framework::{ActorClient, ActorEntity, FrameworkError, ResourceClient};
/// use async_trait::async_trait;
///
/// #[derive(Clone, Debug)]
/// struct User { id: u32 }
/// #[derive(Debug)] struct UserCreate;
/// #[derive(Debug, thiserror::Error)]
/// #[error("{0}")]
/// struct UserError(String);
///
/// #[async_trait]
/// impl ActorEntity for User {
///     type Id = u32;
///     type Create = UserCreate;
///     type Update = ();
///     type Action = ();
///     type ActionResult = ();
///     type Context = ();
///     type Filter = ();
///     type Error = UserError;
///
///     fn from_create_params(id: u32, _: UserCreate) -> Result<Self, Self::Error> {
///         Ok(Self { id })
///     }
///     async fn on_update(&mut self, _: (), _: &()) -> Result<(), Self::Error> { Ok(()) }
///     async fn handle_action(&mut self, _: (), _: &()) -> Result<(), Self::Error> { Ok(()) }
/// }
///
/// struct UserClient {
///     inner: ResourceClient<User>,
/// }
///
/// #[async_trait]
/// impl ActorClient<User> for UserClient {
///     type Error = UserError;
///
///     fn inner(&self) -> &ResourceClient<User> {
///         &self.inner
///     }
///
///     fn map_error(e: FrameworkError) -> Self::Error {
///         UserError(e.to_string())
///     }
/// }
///
/// async fn usage(client: UserClient) {
///     let _ = client.get(1).await;
/// }
/// ```
#[async_trait]
pub trait ActorClient<T: ActorEntity>: Send + Sync {
    /// The resource-specific error type.
    type Error: Send + Sync;

    /// Access the inner generic ResourceClient.
    fn inner(&self) -> &ResourceClient<T>;

    /// Map framework errors to the specific resource error type.
    fn map_error(e: FrameworkError) -> Self::Error;

    /// Fetch an entity by ID.
    #[tracing::instrument(skip(self))]
    async fn get(&self, id: T::Id) -> Result<Option<T>, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().get(id).await.map_err(Self::map_error)
    }

    /// Fetch one page of entities matching `filter`, newest first.
    #[tracing::instrument(skip(self))]
    async fn list(&self, filter: T::Filter, page: Page) -> Result<Listing<T>, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().list(filter, page).await.map_err(Self::map_error)
    }
}
