use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

use crate::persistence::DataStore;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub checks: HealthChecks,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthChecks {
    pub database: String,
}

pub struct HealthHandler {
    store: Option<DataStore>,
    start_time: std::time::Instant,
}

impl HealthHandler {
    pub fn new(store: Option<DataStore>) -> Self {
        Self {
            store,
            start_time: std::time::Instant::now(),
        }
    }

    /// Liveness plus a database ping. Returns 503 when the database is down.
    pub async fn health(&self) -> impl IntoResponse {
        let database = match &self.store {
            Some(store) => match store.health_check().await {
                Ok(()) => "ok".to_string(),
                Err(e) => {
                    tracing::warn!("Database health check failed: {}", e);
                    "unavailable".to_string()
                }
            },
            None => "disabled".to_string(),
        };

        let healthy = database != "unavailable";
        let status = HealthStatus {
            status: if healthy { "healthy" } else { "degraded" }.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            checks: HealthChecks { database },
        };

        let code = if healthy {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        };
        (code, Json(status))
    }
}
