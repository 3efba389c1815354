//! Database connection pool management

use crate::persistence::error::PersistenceError;
use sqlx::{any::AnyPoolOptions, AnyPool};
use std::time::Duration;

/// Connection pool for the provider-config database.
///
/// Only SQLite URLs are accepted: `sqlite://gaunt.db` or `sqlite::memory:`.
#[derive(Clone)]
pub struct ConnectionPool {
    pool: AnyPool,
}

impl ConnectionPool {
    /// Create a new connection pool from a database URL
    ///
    /// # Arguments
    ///
    /// * `url` - SQLite connection URL
    /// * `max_connections` - Maximum number of connections in the pool
    /// * `connect_timeout_secs` - Connection timeout in seconds
    pub async fn new(
        url: &str,
        max_connections: u32,
        connect_timeout_secs: u64,
    ) -> Result<Self, PersistenceError> {
        sqlx::any::install_default_drivers();
        ensure_sqlite(url)?;

        tracing::info!("Connecting to SQLite database with max {} connections", max_connections);

        let pool = AnyPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(connect_timeout_secs))
            .connect(url)
            .await
            .map_err(|e| PersistenceError::Connection(e.to_string()))?;

        tracing::info!("Connected to {}", url);

        Ok(Self { pool })
    }

    /// Get the underlying connection pool
    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    /// Check if the database connection is healthy
    pub async fn health_check(&self) -> Result<(), PersistenceError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| PersistenceError::Connection(format!("Health check failed: {}", e)))?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn ensure_sqlite(url: &str) -> Result<(), PersistenceError> {
    if url.starts_with("sqlite:") {
        Ok(())
    } else {
        Err(PersistenceError::Connection(format!(
            "Unsupported database URL format. Expected sqlite://. Got: {}",
            url.split(':').next().unwrap_or("unknown")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_sqlite_urls() {
        assert!(ensure_sqlite("sqlite://gaunt.db").is_ok());
        assert!(ensure_sqlite("sqlite::memory:").is_ok());
        assert!(ensure_sqlite("postgres://localhost/db").is_err());
    }

    #[tokio::test]
    async fn test_memory_pool_is_healthy() {
        let pool = ConnectionPool::new("sqlite::memory:", 1, 5).await.unwrap();
        pool.health_check().await.unwrap();
        pool.close().await;
    }
}
