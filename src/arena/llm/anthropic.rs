//! Anthropic messages API

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{
    trim_base_url, ChatMessage, ChatRole, CompletionRequest, CompletionResponse, LlmProvider,
    ProviderEndpoint, TokenUsage, ANTHROPIC_VERSION,
};
use crate::arena::error::{CallError, LlmResult};

/// Provider speaking the Anthropic `/messages` shape
pub struct AnthropicProvider {
    client: reqwest::Client,
    name: String,
    api_key: String,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl AnthropicProvider {
    pub fn new(client: reqwest::Client, endpoint: ProviderEndpoint) -> Self {
        Self {
            client,
            name: endpoint.name,
            api_key: endpoint.api_key,
            base_url: trim_base_url(&endpoint.base_url),
            model: endpoint.model,
            timeout: endpoint.timeout,
        }
    }

    fn build_request_body(&self, request: &CompletionRequest) -> Value {
        let (system_prompt, messages) = convert_messages(&request.messages);

        let mut body = json!({
            "model": self.model,
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
            "messages": messages,
        });

        if let Some(system) = system_prompt {
            body["system"] = json!(system);
        }

        body
    }
}

/// Split the leading system message from the conversation.
/// Returns (system_prompt, messages)
fn convert_messages(messages: &[ChatMessage]) -> (Option<String>, Vec<Value>) {
    let (system_prompt, rest) = match messages.split_first() {
        Some((first, rest)) if first.role == ChatRole::System => (Some(first.content.clone()), rest),
        _ => (None, messages),
    };

    let converted = rest
        .iter()
        .map(|m| {
            // Anthropic only knows user and assistant turns
            let role = match m.role {
                ChatRole::Assistant => "assistant",
                ChatRole::User | ChatRole::System => "user",
            };
            json!({ "role": role, "content": m.content })
        })
        .collect();

    (system_prompt, converted)
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> LlmResult<CompletionResponse> {
        let body = self.build_request_body(&request);

        let response = self
            .client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CallError::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let parsed: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| CallError::Parse(format!("Failed to parse response: {}", e)))?;

        let content = parsed
            .content
            .into_iter()
            .next()
            .and_then(|block| block.text)
            .ok_or_else(|| CallError::Parse("Response has no content[0].text".to_string()))?;

        let usage = parsed.usage.map(|u| TokenUsage {
            prompt_tokens: u.input_tokens,
            completion_tokens: u.output_tokens,
            total_tokens: u.input_tokens.saturating_add(u.output_tokens),
        });

        Ok(CompletionResponse { content, usage })
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
    usage: Option<AnthropicUsage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}
