use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from DatabaseManager
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Schema setup failed: {0}")]
    SchemaError(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Owns the application's PostgreSQL pool
pub struct DatabaseManager {
    pool: RwLock<Option<PgPool>>,
}

impl DatabaseManager {
    fn instance() -> &'static DatabaseManager {
        use std::sync::OnceLock;
        static INSTANCE: OnceLock<DatabaseManager> = OnceLock::new();
        INSTANCE.get_or_init(|| DatabaseManager {
            pool: RwLock::new(None),
        })
    }

    /// Schema applied by `blogctl init schema`
    pub const SCHEMA_SQL: &'static str = include_str!("../../sql/schema.sql");

    /// Get the main pool, connecting lazily on first use
    pub async fn main_pool(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let manager = Self::instance();

        // Fast path: try read lock
        {
            let pool = manager.pool.read().await;
            if let Some(pool) = pool.as_ref() {
                return Ok(pool.clone());
            }
        }

        let mut slot = manager.pool.write().await;
        if let Some(pool) = slot.as_ref() {
            return Ok(pool.clone());
        }

        let url = std::env::var("DATABASE_URL")
            .map_err(|_| DatabaseError::ConfigMissing("DATABASE_URL"))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(&url)
            .await?;

        info!(
            "Created database pool (max_connections={})",
            config.max_connections
        );
        *slot = Some(pool.clone());
        Ok(pool)
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }

    /// Create tables and indexes if they are missing
    pub async fn apply_schema(pool: &PgPool) -> Result<(), DatabaseError> {
        use sqlx::Executor;

        pool.execute(Self::SCHEMA_SQL)
            .await
            .map_err(|e| DatabaseError::SchemaError(e.to_string()))?;
        info!("Applied database schema");
        Ok(())
    }

    /// Close the pool (e.g., on shutdown)
    pub async fn close() {
        let manager = Self::instance();
        if let Some(pool) = manager.pool.write().await.take() {
            pool.close().await;
            info!("Closed database pool");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_declares_every_table() {
        for table in ["users", "user_roles", "admin_requests", "admin_approvals"] {
            assert!(
                DatabaseManager::SCHEMA_SQL.contains(&format!("CREATE TABLE IF NOT EXISTS {}", table)),
                "schema is missing table {}",
                table
            );
        }
    }

    #[test]
    fn schema_enforces_single_pending_request() {
        assert!(DatabaseManager::SCHEMA_SQL.contains("WHERE status = 'pending'"));
    }
}
