use crate::clients::{remote_error, UserDirectory};
use crate::model::{User, UserCreate, UserId};
use crate::user_actor::UserError;
use actor_framework::{ActorClient, FrameworkError, ResourceClient};
use async_trait::async_trait;
use resilience::RemoteError;
use tracing::{debug, instrument};

/// Client for interacting with the User actor.
#[derive(Clone)]
pub struct UserClient {
    inner: ResourceClient<User>,
}

impl UserClient {
    pub fn new(inner: ResourceClient<User>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ActorClient<User> for UserClient {
    type Error = UserError;

    fn inner(&self) -> &ResourceClient<User> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e.entity_error::<UserError>() {
            Some(inner) => inner.clone(),
            None => UserError::ActorCommunicationError(e.to_string()),
        }
    }
}

impl UserClient {
    #[instrument(skip(self))]
    pub async fn create_user(&self, params: UserCreate) -> Result<UserId, UserError> {
        debug!("Sending request");
        self.inner
            .create(params)
            .await
            .map(|user| user.id)
            .map_err(Self::map_error)
    }
}

#[async_trait]
impl UserDirectory for UserClient {
    #[instrument(skip(self))]
    async fn get_user(&self, id: UserId) -> Result<User, RemoteError> {
        match self.inner.get(id).await {
            Ok(Some(user)) => Ok(user),
            Ok(None) => Err(RemoteError::not_found(format!("{id} not found"))),
            Err(e) => Err(remote_error(e)),
        }
    }
}
