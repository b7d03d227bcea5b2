//! SeaORM-backed repository implementation for the domain port.
//!
//! Generic over `C: ConnectionTrait`, so it works with a `DatabaseConnection`
//! or a transaction. Every round trip runs under the caller's [`RequestCtx`].

use std::future::Future;

use modkit::RequestCtx;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter};

use crate::contract::{NewUser, User, UserPatch, UsersInfoError};
use crate::domain::repo::{merge_patch, new_record, UsersRepository};
use crate::infra::storage::entity::{Column, Entity as UserEntity};
use crate::infra::storage::mapper::to_active_model;

/// SeaORM repository impl.
/// Holds a connection object; its lifetime/ownership is up to the caller.
pub struct SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

/// One store round trip, bounded by the request's cancellation and deadline.
async fn round_trip<T, F>(ctx: &RequestCtx, op: &'static str, fut: F) -> Result<T, UsersInfoError>
where
    F: Future<Output = Result<T, DbErr>>,
{
    match ctx.run(fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(UsersInfoError::persistence(format!("{op}: {e}"))),
        Err(reason) => {
            tracing::warn!(operation = op, %reason, "store round trip interrupted");
            Err(UsersInfoError::timeout(op, reason))
        }
    }
}

#[async_trait::async_trait]
impl<C> UsersRepository for SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn create(&self, ctx: &RequestCtx, new_user: NewUser) -> Result<User, UsersInfoError> {
        let user = new_record(new_user);
        round_trip(
            ctx,
            "users.insert",
            UserEntity::insert(to_active_model(&user)).exec_without_returning(&self.conn),
        )
        .await?;
        Ok(user)
    }

    async fn get_by_id(&self, ctx: &RequestCtx, id: &str) -> Result<User, UsersInfoError> {
        round_trip(
            ctx,
            "users.find_by_id",
            UserEntity::find_by_id(id.to_owned()).one(&self.conn),
        )
        .await?
        .map(Into::into)
        .ok_or_else(|| UsersInfoError::not_found(id))
    }

    async fn update(
        &self,
        ctx: &RequestCtx,
        id: &str,
        patch: UserPatch,
    ) -> Result<User, UsersInfoError> {
        let current = self.get_by_id(ctx, id).await?;
        let merged = merge_patch(current, &patch);

        let res = round_trip(
            ctx,
            "users.update",
            UserEntity::update_many()
                .set(to_active_model(&merged))
                .filter(Column::Id.eq(id))
                .exec(&self.conn),
        )
        .await?;

        // Deleted between the read and the write.
        if res.rows_affected == 0 {
            return Err(UsersInfoError::not_found(id));
        }
        Ok(merged)
    }

    async fn delete(&self, ctx: &RequestCtx, id: &str) -> Result<(), UsersInfoError> {
        let res = round_trip(
            ctx,
            "users.delete",
            UserEntity::delete_by_id(id.to_owned()).exec(&self.conn),
        )
        .await?;

        if res.rows_affected == 0 {
            return Err(UsersInfoError::not_found(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::storage::entity::Model;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn stored_row() -> Model {
        let user = new_record(NewUser {
            first_name: "John".into(),
            last_name: "Doe".into(),
            email: "john@example.com".into(),
        });
        Model {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }

    #[tokio::test]
    async fn update_reports_not_found_when_row_vanishes_before_write() {
        let row = stored_row();
        let id = row.id.clone();
        let conn = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_results([vec![row]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();
        let repo = SeaOrmUsersRepository::new(conn);

        let patch = UserPatch {
            first_name: Some("Jane".into()),
            ..UserPatch::default()
        };
        let err = repo
            .update(&RequestCtx::background(), &id, patch)
            .await
            .unwrap_err();
        assert_eq!(err, UsersInfoError::not_found(id));
    }

    #[tokio::test]
    async fn store_errors_become_persistence_failures() {
        let conn = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_errors([DbErr::Custom("disk I/O error".into())])
            .into_connection();
        let repo = SeaOrmUsersRepository::new(conn);

        let err = repo
            .get_by_id(&RequestCtx::background(), "any")
            .await
            .unwrap_err();
        match err {
            UsersInfoError::Persistence { message } => {
                assert!(message.starts_with("users.find_by_id: "), "{message}");
            }
            other => panic!("expected persistence failure, got {other:?}"),
        }
    }
}
