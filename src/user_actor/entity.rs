//! [`ActorEntity`] implementation for [`User`].

use super::UserError;
use crate::model::{User, UserCreate, UserId};
use actor_framework::ActorEntity;
use async_trait::async_trait;

fn check_email(email: &str) -> Result<(), UserError> {
    if email.contains('@') {
        Ok(())
    } else {
        Err(UserError::ValidationError(format!("invalid email {email:?}")))
    }
}

#[async_trait]
impl ActorEntity for User {
    type Id = UserId;
    type Create = UserCreate;
    type Update = ();
    type Action = ();
    type ActionResult = ();
    type Context = ();
    type Filter = ();
    type Error = UserError;

    fn from_create_params(id: UserId, params: UserCreate) -> Result<Self, Self::Error> {
        if params.name.trim().is_empty() {
            return Err(UserError::ValidationError("name is required".into()));
        }
        check_email(&params.email)?;
        Ok(Self {
            id,
            name: params.name,
            email: params.email,
        })
    }

    async fn on_update(&mut self, _update: (), _ctx: &()) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn handle_action(&mut self, _action: (), _ctx: &()) -> Result<(), Self::Error> {
        Ok(())
    }
}
