pub mod metric_repo;

pub use metric_repo::{MetricRepository, PersistedMetric};

use crate::error::{ApiError, ApiResult};
use sqlx::{
    migrate::Migrator,
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
};
use std::{str::FromStr, time::Duration};
use tracing::info;

// Embeds all migration files from ./migrations at compile time
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[derive(Clone, Debug)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if absent) the SQLite mirror and run migrations.
    pub async fn connect(database_url: &str) -> ApiResult<Self> {
        info!("Opening metrics database...");

        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| ApiError::InvalidDatabaseUrl {
                message: e.to_string(),
            })?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .acquire_timeout(Duration::from_secs(5))
            .connect_with(options)
            .await?;

        Self::from_pool(pool).await
    }

    /// Create a Database instance from an existing pool (useful for tests)
    pub async fn from_pool(pool: SqlitePool) -> ApiResult<Self> {
        MIGRATOR.run(&pool).await?;
        info!("Database initialization complete");
        Ok(Self { pool })
    }

    #[must_use]
    pub fn metrics(&self) -> MetricRepository {
        MetricRepository::new(self.pool.clone())
    }
}
