use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{create_provider, CompletionRequest, CompletionResponse, ProviderEndpoint, RequestShape, TokenUsage};
use crate::adapters::encryption;
use crate::adapters::secrets::SharedPassphraseStore;
use crate::arena::error::{CallError, LlmResult};
use crate::domain::catalog::default_base_url;
use crate::domain::{Provider, Secret};

/// Everything needed to call one model once
#[derive(Debug, Clone)]
pub struct ModelCall<'a> {
    pub provider: &'a Provider,
    /// Model name sent on the wire
    pub model: &'a str,
    pub base_url_override: Option<&'a str>,
    /// Secret whose alias matches the provider's `api_key_alias`
    pub secret: Option<&'a Secret>,
    pub request: CompletionRequest,
    pub timeout: Duration,
}

/// Normalized outcome of a model call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelCallResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

impl ModelCallResult {
    pub fn ok(response: CompletionResponse) -> Self {
        Self {
            success: true,
            content: Some(response.content),
            error: None,
            usage: response.usage,
        }
    }

    pub fn failure(error: &CallError) -> Self {
        Self {
            success: false,
            content: None,
            error: Some(error.to_string()),
            usage: None,
        }
    }
}

impl From<LlmResult<CompletionResponse>> for ModelCallResult {
    fn from(result: LlmResult<CompletionResponse>) -> Self {
        match result {
            Ok(response) => ModelCallResult::ok(response),
            Err(e) => ModelCallResult::failure(&e),
        }
    }
}

/// Port through which the engine reaches live models
#[async_trait]
pub trait ModelCallPort: Send + Sync {
    /// Call a model. Failures are reported in the result, never raised.
    async fn call_model(&self, call: ModelCall<'_>) -> ModelCallResult;
}

/// HTTP implementation of [`ModelCallPort`]
pub struct ModelCallAdapter {
    client: reqwest::Client,
    passphrases: SharedPassphraseStore,
}

impl ModelCallAdapter {
    pub fn new(passphrases: SharedPassphraseStore) -> Self {
        Self {
            client: reqwest::Client::new(),
            passphrases,
        }
    }

    async fn try_call(&self, call: ModelCall<'_>) -> LlmResult<CompletionResponse> {
        let api_key = self.resolve_credential(call.secret).await?;
        let shape = RequestShape::resolve(call.provider)?;
        let base_url = resolve_base_url(call.provider, call.base_url_override)?;

        let llm = create_provider(
            shape,
            self.client.clone(),
            ProviderEndpoint {
                name: call.provider.name.clone(),
                base_url,
                api_key,
                model: call.model.to_string(),
                timeout: call.timeout,
            },
        );
        debug!("Calling {} model {} ({:?})", llm.name(), llm.model(), shape);
        llm.complete(call.request).await
    }

    async fn resolve_credential(&self, secret: Option<&Secret>) -> LlmResult<String> {
        let secret = secret.ok_or(CallError::CredentialUnavailable)?;
        let passphrase = self
            .passphrases
            .get()
            .await
            .ok_or(CallError::CredentialUnavailable)?;

        encryption::decrypt(&secret.value_encrypted, &passphrase).map_err(|e| {
            debug!("Could not decrypt secret {}: {}", secret.alias, e);
            CallError::CredentialUnavailable
        })
    }
}

#[async_trait]
impl ModelCallPort for ModelCallAdapter {
    async fn call_model(&self, call: ModelCall<'_>) -> ModelCallResult {
        let provider = call.provider;
        let result = self.try_call(call).await;
        if let Err(e) = &result {
            if e.is_provider_call_failure() {
                warn!("Request to {} failed: {}", provider.name, e);
            } else {
                warn!("Call to {} not attempted: {}", provider.name, e);
            }
        }
        result.into()
    }
}

/// Override, then provider URL, then the catalog default for the slug
fn resolve_base_url(provider: &Provider, base_url_override: Option<&str>) -> LlmResult<String> {
    base_url_override
        .filter(|url| !url.is_empty())
        .or(provider.base_url.as_deref().filter(|url| !url.is_empty()))
        .or_else(|| default_base_url(&provider.slug))
        .map(str::to_string)
        .ok_or_else(|| CallError::Configuration(format!("No base URL for provider {}", provider.id)))
}
