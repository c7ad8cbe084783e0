pub mod infrastructure;
pub mod ports;

use std::fmt;
use std::time::Duration;

use sqlx::{PgPool, postgres::PgPoolOptions};
use tracing::info;

use crate::MIGRATOR;
use crate::error::{CoreError, Result};

pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Connection pool shared by every Postgres repository.
#[derive(Clone)]
pub struct PostgresDatabase {
    pool: PgPool,
}

impl fmt::Debug for PostgresDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresDatabase")
            .field("pool_size", &self.pool.size())
            .field("idle_connections", &self.pool.num_idle())
            .finish()
    }
}

impl PostgresDatabase {
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections.max(1))
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(url)
            .await
            .map_err(|e| {
                CoreError::Internal(format!("Database connection failed: {e}"))
            })?;

        info!(max_connections, "database pool initialized");
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn migrate(&self) -> Result<()> {
        MIGRATOR.run(&self.pool).await.map_err(|e| {
            CoreError::Internal(format!("Failed to run migrations: {e}"))
        })?;
        info!("database migrations applied");
        Ok(())
    }
}
