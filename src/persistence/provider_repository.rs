//! Provider-config table backing the stub REST server

use crate::persistence::error::PersistenceError;
use crate::persistence::pool::ConnectionPool;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::any::AnyRow;
use sqlx::Row;

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS ProviderConfig (
    id TEXT PRIMARY KEY,
    providerName TEXT,
    providerSlug TEXT,
    apiKey TEXT,
    model TEXT,
    getKeyUrl TEXT,
    customConnectorCode TEXT
)
"#;

/// One row of `ProviderConfig`. `api_key` holds the encrypted key, or an
/// empty string when none was supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderRecord {
    pub id: String,
    pub provider_name: Option<String>,
    pub provider_slug: Option<String>,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub get_key_url: Option<String>,
    pub custom_connector_code: Option<String>,
}

impl ProviderRecord {
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    fn from_row(row: &AnyRow) -> Result<Self, PersistenceError> {
        Ok(Self {
            id: row.try_get("id")?,
            provider_name: row.try_get("providerName")?,
            provider_slug: row.try_get("providerSlug")?,
            api_key: row.try_get("apiKey")?,
            model: row.try_get("model")?,
            get_key_url: row.try_get("getKeyUrl")?,
            custom_connector_code: row.try_get("customConnectorCode")?,
        })
    }
}

/// Repository for provider-config CRUD operations
#[async_trait]
pub trait ProviderRepository: Send + Sync {
    /// Create the table if it does not exist yet
    async fn init(&self) -> Result<(), PersistenceError>;

    async fn list(&self) -> Result<Vec<ProviderRecord>, PersistenceError>;

    async fn get(&self, id: &str) -> Result<Option<ProviderRecord>, PersistenceError>;

    async fn create(&self, record: &ProviderRecord) -> Result<(), PersistenceError>;

    /// Replace every column of the row with `record.id`
    async fn update(&self, record: &ProviderRecord) -> Result<(), PersistenceError>;

    async fn delete(&self, id: &str) -> Result<(), PersistenceError>;
}

/// SQLx-based implementation of ProviderRepository
#[derive(Clone)]
pub struct SqlxProviderRepository {
    pool: ConnectionPool,
}

impl SqlxProviderRepository {
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProviderRepository for SqlxProviderRepository {
    async fn init(&self) -> Result<(), PersistenceError> {
        sqlx::query(CREATE_TABLE).execute(self.pool.pool()).await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ProviderRecord>, PersistenceError> {
        let rows = sqlx::query("SELECT * FROM ProviderConfig ORDER BY id")
            .fetch_all(self.pool.pool())
            .await?;

        rows.iter().map(ProviderRecord::from_row).collect()
    }

    async fn get(&self, id: &str) -> Result<Option<ProviderRecord>, PersistenceError> {
        let row = sqlx::query("SELECT * FROM ProviderConfig WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool.pool())
            .await?;

        row.as_ref().map(ProviderRecord::from_row).transpose()
    }

    async fn create(&self, record: &ProviderRecord) -> Result<(), PersistenceError> {
        sqlx::query(
            "INSERT INTO ProviderConfig (id, providerName, providerSlug, apiKey, model, getKeyUrl, customConnectorCode) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.id)
        .bind(&record.provider_name)
        .bind(&record.provider_slug)
        .bind(&record.api_key)
        .bind(&record.model)
        .bind(&record.get_key_url)
        .bind(&record.custom_connector_code)
        .execute(self.pool.pool())
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                PersistenceError::Duplicate(record.id.clone())
            }
            other => PersistenceError::Database(other),
        })?;

        tracing::debug!("Created provider config {}", record.id);
        Ok(())
    }

    async fn update(&self, record: &ProviderRecord) -> Result<(), PersistenceError> {
        let result = sqlx::query(
            "UPDATE ProviderConfig SET providerName = ?, providerSlug = ?, apiKey = ?, model = ?, getKeyUrl = ?, customConnectorCode = ? WHERE id = ?",
        )
        .bind(&record.provider_name)
        .bind(&record.provider_slug)
        .bind(&record.api_key)
        .bind(&record.model)
        .bind(&record.get_key_url)
        .bind(&record.custom_connector_code)
        .bind(&record.id)
        .execute(self.pool.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::NotFound(record.id.clone()));
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), PersistenceError> {
        let result = sqlx::query("DELETE FROM ProviderConfig WHERE id = ?")
            .bind(id)
            .execute(self.pool.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::NotFound(id.to_string()));
        }
        Ok(())
    }
}
