use sea_orm_migration::prelude::*;

mod m20240101_000001_create_users;
mod m20240102_000001_index_users_email;

/// Versioned schema for the users table. Applied migrations are recorded in
/// `seaql_migrations` and skipped on later runs.
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_users::Migration),
            Box::new(m20240102_000001_index_users_email::Migration),
        ]
    }
}

#[derive(DeriveIden)]
pub(crate) enum Users {
    Table,
    Id,
    FirstName,
    LastName,
    Email,
    CreatedAt,
    UpdatedAt,
}
