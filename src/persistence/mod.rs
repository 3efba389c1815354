//! Database persistence for the stub REST server
//!
//! Provider configurations live in a single SQLite table, `ProviderConfig`,
//! accessed through [`ProviderRepository`].
//!
//! # Example
//!
//! ```rust,no_run
//! use gaunt::persistence::{DataStore, PersistenceConfig};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PersistenceConfig {
//!         url: "sqlite://gaunt.db?mode=rwc".to_string(),
//!         max_connections: 5,
//!     };
//!
//!     let store = DataStore::new(&config).await?;
//!     let providers = store.providers().clone();
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod pool;
pub mod provider_repository;

pub use error::PersistenceError;
pub use pool::ConnectionPool;
pub use provider_repository::{ProviderRecord, ProviderRepository, SqlxProviderRepository};

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Configuration for the persistence layer
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PersistenceConfig {
    /// `sqlite://path.db?mode=rwc` or `sqlite::memory:`
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://gaunt.db?mode=rwc".to_string(),
            max_connections: default_max_connections(),
        }
    }
}

/// Connection pool plus the provider repository, with the schema in place
#[derive(Clone)]
pub struct DataStore {
    pool: ConnectionPool,
    providers: Arc<SqlxProviderRepository>,
}

impl DataStore {
    /// Connect and create the `ProviderConfig` table if needed
    pub async fn new(config: &PersistenceConfig) -> Result<Self, PersistenceError> {
        let pool = ConnectionPool::new(&config.url, config.max_connections, 30).await?;
        let providers = Arc::new(SqlxProviderRepository::new(pool.clone()));
        providers.init().await?;

        Ok(Self { pool, providers })
    }

    pub fn providers(&self) -> &Arc<SqlxProviderRepository> {
        &self.providers
    }

    pub async fn health_check(&self) -> Result<(), PersistenceError> {
        self.pool.health_check().await
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
