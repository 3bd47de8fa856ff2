use crate::clients::UserDirectory;
use crate::model::UserId;
use resilience::{CallOutcome, GuardedCaller};
use std::sync::Arc;
use tracing::instrument;

/// Checks that a user exists in the user service.
#[derive(Clone)]
pub struct UserValidator {
    directory: Arc<dyn UserDirectory>,
    guard: GuardedCaller,
}

impl UserValidator {
    pub fn new(directory: Arc<dyn UserDirectory>, guard: GuardedCaller) -> Self {
        Self { directory, guard }
    }

    /// Name of the guarded dependency.
    pub fn dependency(&self) -> &str {
        self.guard.breaker().name()
    }

    pub fn guard(&self) -> &GuardedCaller {
        &self.guard
    }

    #[instrument(skip(self), fields(dependency = %self.dependency()))]
    pub async fn validate_user_exists(&self, id: UserId) -> CallOutcome<()> {
        self.guard
            .call(|| async { self.directory.get_user(id).await.map(|_| ()) })
            .await
    }
}
