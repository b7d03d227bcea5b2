use std::sync::Arc;

use modkit_db::DbHandle;
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::api::rest::routes;
use crate::contract::client::UsersInfoApi;
use crate::domain::service::Service;
use crate::infra::storage::migrations::Migrator;
use crate::infra::storage::SeaOrmUsersRepository;

/// The users_info module: schema, domain service and REST surface over one database.
#[derive(Clone)]
pub struct UsersInfo {
    service: Arc<dyn UsersInfoApi>,
}

impl UsersInfo {
    /// Migrate the schema, then wire repository → service.
    pub async fn init(db: &DbHandle) -> anyhow::Result<Self> {
        info!("Initializing users_info module");
        Self::migrate(db).await?;

        let repo = SeaOrmUsersRepository::new(db.sea());
        let service: Arc<dyn UsersInfoApi> = Arc::new(Service::new(Arc::new(repo)));
        Ok(Self { service })
    }

    /// Apply pending migrations; a failure here must stop startup.
    pub async fn migrate(db: &DbHandle) -> anyhow::Result<()> {
        info!("Running users_info database migrations");
        Migrator::up(db.seaorm(), None).await?;
        info!("Users database migrations completed successfully");
        Ok(())
    }

    pub fn service(&self) -> Arc<dyn UsersInfoApi> {
        self.service.clone()
    }

    pub fn register_rest(&self, router: axum::Router) -> axum::Router {
        info!("Registering users_info REST routes");
        routes::register_routes(router, self.service.clone())
    }
}
