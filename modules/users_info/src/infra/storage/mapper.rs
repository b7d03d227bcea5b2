use sea_orm::Set;

use crate::contract::User;
use crate::infra::storage::entity::{ActiveModel as UserAM, Model as UserEntity};

impl From<UserEntity> for User {
    fn from(e: UserEntity) -> Self {
        Self {
            id: e.id,
            first_name: e.first_name,
            last_name: e.last_name,
            email: e.email,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

/// Every column set; used for both insert and full-row update.
pub fn to_active_model(u: &User) -> UserAM {
    UserAM {
        id: Set(u.id.clone()),
        first_name: Set(u.first_name.clone()),
        last_name: Set(u.last_name.clone()),
        email: Set(u.email.clone()),
        created_at: Set(u.created_at),
        updated_at: Set(u.updated_at),
    }
}
