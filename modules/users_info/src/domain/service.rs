use std::sync::Arc;

use async_trait::async_trait;
use modkit::RequestCtx;
use tracing::{debug, info, instrument};

use crate::contract::{NewUser, User, UserPatch, UsersInfoApi, UsersInfoError};
use crate::domain::repo::UsersRepository;
use crate::domain::validation;

/// Domain service: identifier checks and validation in front of the repository port.
#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn UsersRepository>,
}

impl Service {
    pub fn new(repo: Arc<dyn UsersRepository>) -> Self {
        Self { repo }
    }

    fn require_id(id: &str) -> Result<&str, UsersInfoError> {
        if id.trim().is_empty() {
            return Err(UsersInfoError::MissingIdentifier);
        }
        Ok(id)
    }
}

#[async_trait]
impl UsersInfoApi for Service {
    #[instrument(
        name = "users_info.service.create_user",
        skip(self, ctx, new_user),
        fields(email = %new_user.email)
    )]
    async fn create_user(
        &self,
        ctx: &RequestCtx,
        new_user: NewUser,
    ) -> Result<User, UsersInfoError> {
        validation::validate_new_user(&new_user)?;
        let user = self.repo.create(ctx, new_user).await?;
        info!(user_id = %user.id, "user created");
        Ok(user)
    }

    #[instrument(name = "users_info.service.get_user", skip(self, ctx), fields(user_id = %id))]
    async fn get_user(&self, ctx: &RequestCtx, id: &str) -> Result<User, UsersInfoError> {
        let id = Self::require_id(id)?;
        debug!("getting user by id");
        self.repo.get_by_id(ctx, id).await
    }

    #[instrument(name = "users_info.service.update_user", skip(self, ctx, patch), fields(user_id = %id))]
    async fn update_user(
        &self,
        ctx: &RequestCtx,
        id: &str,
        patch: UserPatch,
    ) -> Result<User, UsersInfoError> {
        let id = Self::require_id(id)?;
        let patch = validation::normalize_patch(patch);
        validation::validate_patch(&patch)?;
        let user = self.repo.update(ctx, id, patch).await?;
        info!("user updated");
        Ok(user)
    }

    #[instrument(name = "users_info.service.delete_user", skip(self, ctx), fields(user_id = %id))]
    async fn delete_user(&self, ctx: &RequestCtx, id: &str) -> Result<(), UsersInfoError> {
        let id = Self::require_id(id)?;
        self.repo.delete(ctx, id).await?;
        info!("user deleted");
        Ok(())
    }
}
