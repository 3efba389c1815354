use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::adapters::encryption;
use crate::persistence::{PersistenceError, ProviderRecord, ProviderRepository};

/// Fallback server secret for API-key encryption when none is configured
pub const DEFAULT_SERVER_SECRET: &str = "default_secret_key";

#[derive(Clone)]
pub struct ApiState {
    pub providers: Arc<dyn ProviderRepository>,
    /// Passphrase sealing stored API keys
    pub secret_key: Arc<str>,
}

impl ApiState {
    pub fn new(providers: Arc<dyn ProviderRepository>, secret_key: impl Into<Arc<str>>) -> Self {
        Self {
            providers,
            secret_key: secret_key.into(),
        }
    }
}

// ============================================================================
// Response envelope
// ============================================================================

#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

impl ApiResponse<()> {
    pub fn ok() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
        }
    }
}

fn persistence_failure(e: PersistenceError) -> (StatusCode, Json<ApiResponse<()>>) {
    if e.status_code().is_server_error() {
        tracing::error!("Provider config storage failed: {}", e);
    }
    (e.status_code(), Json(ApiResponse::error(e.to_string())))
}

// ============================================================================
// Provider configs
// ============================================================================

/// Provider config as submitted by clients. `api_key` is plaintext.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfigDto {
    #[serde(default)]
    pub id: String,
    pub provider_name: Option<String>,
    pub provider_slug: Option<String>,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub get_key_url: Option<String>,
    pub custom_connector_code: Option<String>,
}

/// Provider config as listed; the key itself never leaves the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfigView {
    pub id: String,
    pub provider_name: Option<String>,
    pub provider_slug: Option<String>,
    pub model: Option<String>,
    pub get_key_url: Option<String>,
    pub custom_connector_code: Option<String>,
    pub has_api_key: bool,
}

impl From<ProviderRecord> for ProviderConfigView {
    fn from(record: ProviderRecord) -> Self {
        Self {
            has_api_key: record.has_api_key(),
            id: record.id,
            provider_name: record.provider_name,
            provider_slug: record.provider_slug,
            model: record.model,
            get_key_url: record.get_key_url,
            custom_connector_code: record.custom_connector_code,
        }
    }
}

/// Build the stored row, sealing a non-empty API key with the server secret
async fn seal_record(
    secret_key: Arc<str>,
    id: String,
    dto: ProviderConfigDto,
) -> Result<ProviderRecord, String> {
    let api_key = match dto.api_key.filter(|k| !k.is_empty()) {
        Some(plaintext) => tokio::task::spawn_blocking(move || encryption::encrypt(&plaintext, &secret_key))
            .await
            .map_err(|e| e.to_string())?
            .map_err(|e| e.to_string())?,
        None => String::new(),
    };

    Ok(ProviderRecord {
        id,
        provider_name: dto.provider_name,
        provider_slug: dto.provider_slug,
        api_key: Some(api_key),
        model: dto.model,
        get_key_url: dto.get_key_url,
        custom_connector_code: dto.custom_connector_code,
    })
}

/// GET /api/providers - List provider configs
pub async fn list_providers(State(state): State<ApiState>) -> impl IntoResponse {
    match state.providers.list().await {
        Ok(records) => {
            let views: Vec<ProviderConfigView> = records.into_iter().map(Into::into).collect();
            (StatusCode::OK, Json(ApiResponse::success(views))).into_response()
        }
        Err(e) => persistence_failure(e).into_response(),
    }
}

/// POST /api/providers - Create a provider config
pub async fn create_provider(
    State(state): State<ApiState>,
    Json(dto): Json<ProviderConfigDto>,
) -> impl IntoResponse {
    if dto.id.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::error("Provider config id is required")),
        );
    }

    let id = dto.id.clone();
    let record = match seal_record(state.secret_key.clone(), id, dto).await {
        Ok(record) => record,
        Err(e) => {
            tracing::error!("Failed to encrypt API key: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(format!("Failed to encrypt API key: {}", e))),
            );
        }
    };

    match state.providers.create(&record).await {
        Ok(()) => {
            tracing::info!("Created provider config {}", record.id);
            (StatusCode::CREATED, Json(ApiResponse::ok()))
        }
        Err(e) => persistence_failure(e),
    }
}

/// PUT /api/providers/:id - Replace a provider config.
///
/// An omitted API key clears the stored one.
pub async fn update_provider(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(dto): Json<ProviderConfigDto>,
) -> impl IntoResponse {
    let record = match seal_record(state.secret_key.clone(), id, dto).await {
        Ok(record) => record,
        Err(e) => {
            tracing::error!("Failed to encrypt API key: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(format!("Failed to encrypt API key: {}", e))),
            );
        }
    };

    match state.providers.update(&record).await {
        Ok(()) => (StatusCode::OK, Json(ApiResponse::ok())),
        Err(e) => persistence_failure(e),
    }
}

/// DELETE /api/providers/:id - Delete a provider config
pub async fn delete_provider(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.providers.delete(&id).await {
        Ok(()) => {
            tracing::info!("Deleted provider config {}", id);
            (StatusCode::OK, Json(ApiResponse::ok()))
        }
        Err(e) => persistence_failure(e),
    }
}

// ============================================================================
// Arena
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArenaProvider {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub provider_slug: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArenaRequest {
    pub prompt: String,
    #[serde(default)]
    pub providers: Vec<ArenaProvider>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArenaReply {
    pub provider_id: String,
    pub model: String,
    pub response: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArenaResponse {
    pub responses: Vec<ArenaReply>,
}

/// Templated reply for one provider; no model is called
pub fn mock_arena_reply(provider: &ArenaProvider, prompt: &str) -> ArenaReply {
    ArenaReply {
        provider_id: provider.id.clone(),
        model: provider.model.clone(),
        response: format!(
            "Mock response for {} ({}) to prompt: \"{}\"",
            provider.provider_slug, provider.model, prompt
        ),
    }
}

/// POST /api/arena/respond - One mock reply per requested provider
pub async fn respond_arena(Json(request): Json<ArenaRequest>) -> impl IntoResponse {
    let responses = request
        .providers
        .iter()
        .map(|p| mock_arena_reply(p, &request.prompt))
        .collect();

    (StatusCode::OK, Json(ArenaResponse { responses }))
}
