use async_trait::async_trait;
use modkit::RequestCtx;

use crate::contract::{
    error::UsersInfoError,
    model::{NewUser, User, UserPatch},
};

/// Public API of the users_info module.
#[async_trait]
pub trait UsersInfoApi: Send + Sync {
    /// Validate and persist a new user.
    async fn create_user(&self, ctx: &RequestCtx, new_user: NewUser)
        -> Result<User, UsersInfoError>;

    async fn get_user(&self, ctx: &RequestCtx, id: &str) -> Result<User, UsersInfoError>;

    /// Overlay the non-empty fields of `patch` onto the stored user.
    async fn update_user(
        &self,
        ctx: &RequestCtx,
        id: &str,
        patch: UserPatch,
    ) -> Result<User, UsersInfoError>;

    async fn delete_user(&self, ctx: &RequestCtx, id: &str) -> Result<(), UsersInfoError>;
}
