use std::path::Path;

use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use tracing::info;

pub struct BotDatabase {
    db: DatabaseConnection,
}

impl BotDatabase {
    pub async fn new(path: impl AsRef<Path>) -> Result<Self, DbErr> {
        let database_url = format!("sqlite://{}?mode=rwc", path.as_ref().display());
        Self::connect(database_url).await
    }

    pub async fn new_memory() -> Result<Self, DbErr> {
        Self::connect("sqlite::memory:".to_owned()).await
    }

    async fn connect(url: String) -> Result<Self, DbErr> {
        let mut options = ConnectOptions::new(url);
        // SQLite serializes writers anyway; one connection keeps read-your-writes trivial.
        options.max_connections(1).sqlx_logging(false);
        let db = Database::connect(options).await?;
        Ok(BotDatabase { db })
    }

    /// Applies every pending migration.
    pub async fn migrate(&self) -> Result<(), DbErr> {
        Migrator::up(&self.db, None).await?;
        info!("Database migrations applied");
        Ok(())
    }

    pub fn inner(&self) -> &DatabaseConnection {
        &self.db
    }
}
