use async_trait::async_trait;
use chrono::{DateTime, Duration, SubsecRound, Utc};
use modkit::RequestCtx;

use crate::contract::{NewUser, User, UserPatch, UsersInfoError};

/// Persistence port for users. Every call makes at least one store round trip.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    async fn create(&self, ctx: &RequestCtx, new_user: NewUser) -> Result<User, UsersInfoError>;

    async fn get_by_id(&self, ctx: &RequestCtx, id: &str) -> Result<User, UsersInfoError>;

    /// Read, overlay, write. The two round trips are not wrapped in a transaction.
    async fn update(
        &self,
        ctx: &RequestCtx,
        id: &str,
        patch: UserPatch,
    ) -> Result<User, UsersInfoError>;

    async fn delete(&self, ctx: &RequestCtx, id: &str) -> Result<(), UsersInfoError>;
}

/// Current time at the store's microsecond precision.
pub fn now_micros() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Next `updated_at` for a record last touched at `prev`; always strictly later.
pub fn touch(prev: DateTime<Utc>) -> DateTime<Utc> {
    let now = now_micros();
    let floor = prev + Duration::microseconds(1);
    now.max(floor)
}

/// Fresh record for a validated `NewUser`.
pub fn new_record(new_user: NewUser) -> User {
    let now = now_micros();
    User {
        id: uuid::Uuid::new_v4().to_string(),
        first_name: new_user.first_name,
        last_name: new_user.last_name,
        email: new_user.email,
        created_at: now,
        updated_at: now,
    }
}

/// Overlay the non-empty fields of `patch` onto `current`.
pub fn merge_patch(current: User, patch: &UserPatch) -> User {
    let pick = |new: &Option<String>, old: String| match new {
        Some(v) if !v.is_empty() => v.clone(),
        _ => old,
    };
    let updated_at = touch(current.updated_at);
    User {
        first_name: pick(&patch.first_name, current.first_name),
        last_name: pick(&patch.last_name, current.last_name),
        email: pick(&patch.email, current.email),
        updated_at,
        ..current
    }
}
