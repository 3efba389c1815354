//! Provider HTTP calls behind one interface
//!
//! Two request shapes cover every supported provider:
//! - OpenAI-compatible chat completions (OpenAI, Google, Mistral, DeepSeek,
//!   OpenRouter, Azure and Bedrock gateways)
//! - Anthropic messages
//!
//! [`ModelCallAdapter`] resolves credentials and normalizes every outcome
//! into a [`ModelCallResult`].

mod adapter;
mod anthropic;
mod openai;

pub use adapter::{ModelCall, ModelCallAdapter, ModelCallPort, ModelCallResult};
pub use anthropic::AnthropicProvider;
pub use openai::OpenAiProvider;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::{CallError, LlmResult};
use crate::domain::{Provider, ProviderType};

pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Trait for LLM providers
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name used in logs
    fn name(&self) -> &str;

    /// Model being called
    fn model(&self) -> &str;

    /// Complete a request
    async fn complete(&self, request: CompletionRequest) -> LlmResult<CompletionResponse>;
}

/// Role of a chat message sent to a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Request for a completion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Normalized completion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

/// Token usage information
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Wire format of a provider's chat endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestShape {
    /// `POST {base}/chat/completions` with bearer auth
    OpenAiCompatible,
    /// `POST {base}/messages` with `x-api-key`
    Anthropic,
}

impl RequestShape {
    /// Pick the request shape of a provider
    pub fn resolve(provider: &Provider) -> LlmResult<Self> {
        match &provider.provider_type {
            ProviderType::Direct if provider.slug.eq_ignore_ascii_case("anthropic") => {
                Ok(RequestShape::Anthropic)
            }
            ProviderType::Direct
            | ProviderType::OpenRouter
            | ProviderType::Azure
            | ProviderType::Bedrock => Ok(RequestShape::OpenAiCompatible),
            ProviderType::Other(other) => Err(CallError::UnsupportedProviderType(other.clone())),
        }
    }
}

/// Connection details for a single call
#[derive(Debug, Clone)]
pub struct ProviderEndpoint {
    pub name: String,
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
}

/// Create an LLM provider for a request shape
pub fn create_provider(
    shape: RequestShape,
    client: reqwest::Client,
    endpoint: ProviderEndpoint,
) -> Arc<dyn LlmProvider> {
    match shape {
        RequestShape::OpenAiCompatible => Arc::new(OpenAiProvider::new(client, endpoint)),
        RequestShape::Anthropic => Arc::new(AnthropicProvider::new(client, endpoint)),
    }
}

/// Base URL without a trailing slash
fn trim_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::default_providers;

    fn provider(slug: &str) -> Provider {
        default_providers().into_iter().find(|p| p.slug == slug).unwrap()
    }

    #[test]
    fn test_resolve_shapes() {
        assert_eq!(RequestShape::resolve(&provider("anthropic")).unwrap(), RequestShape::Anthropic);
        assert_eq!(RequestShape::resolve(&provider("openai")).unwrap(), RequestShape::OpenAiCompatible);
        assert_eq!(
            RequestShape::resolve(&provider("openrouter")).unwrap(),
            RequestShape::OpenAiCompatible
        );

        let mut azure = provider("openai");
        azure.provider_type = ProviderType::Azure;
        assert_eq!(RequestShape::resolve(&azure).unwrap(), RequestShape::OpenAiCompatible);
    }

    #[test]
    fn test_unknown_type_is_unsupported() {
        let mut custom = provider("openai");
        custom.provider_type = ProviderType::Other("vertex".to_string());
        match RequestShape::resolve(&custom) {
            Err(CallError::UnsupportedProviderType(t)) => assert_eq!(t, "vertex"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_trim_base_url() {
        assert_eq!(trim_base_url("http://localhost:1234/v1/"), "http://localhost:1234/v1");
    }
}
