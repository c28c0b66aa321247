pub mod entities;
pub mod migrations;
pub mod repositories;

use sea_orm::{
    ConnectOptions, ConnectionTrait, DatabaseConnection, DatabaseTransaction, TransactionTrait,
};
use sea_orm_migration::MigratorTrait;

use crate::{config::DatabaseConfig, error::Result};

use migrations::Migrator;

/// Analytics store for timelapse and statistics rows. Nothing on the ledger
/// path reads from it.
#[derive(Debug, Clone)]
pub struct Database {
    connection: DatabaseConnection,
}

impl Database {
    pub async fn init_db(config: &DatabaseConfig) -> Result<Self> {
        let mut options = ConnectOptions::new(&config.url);

        options
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(config.connect_timeout)
            .idle_timeout(config.idle_timeout)
            .sqlx_logging(false);

        let connection = sea_orm::Database::connect(options).await?;
        tracing::debug!(backend = ?connection.get_database_backend(), "Analytics database connected");

        Ok(Self { connection })
    }

    pub fn get_connection(&self) -> &DatabaseConnection {
        &self.connection
    }

    /// One transaction per processed block keeps snapshot and activity rows in step.
    pub async fn begin_transaction(&self) -> Result<DatabaseTransaction> {
        Ok(self.connection.begin().await?)
    }

    pub async fn run_migrations(&self) -> Result<()> {
        let pending = Migrator::get_pending_migrations(&self.connection).await?;
        Migrator::up(&self.connection, None).await?;

        tracing::info!(applied = pending.len(), "Analytics migrations applied");
        Ok(())
    }
}
