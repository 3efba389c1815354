//! Message generation: live model call first, templated mock on any failure

use std::time::Duration;

use tracing::{debug, info};

use super::llm::{ChatMessage, CompletionRequest, ModelCall, ModelCallPort};
use super::mock::{generate_mock_response, Persona};
use super::scoring::score_message;
use crate::domain::{Agent, AppState, Message};

/// Sampling parameters of live calls
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationSettings {
    /// Used when the agent has no temperature of its own
    pub default_temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            default_temperature: 0.7,
            max_tokens: 1000,
        }
    }
}

/// Generate and score one message for `agent`.
///
/// `context` is every message the agent can see, oldest first; the new
/// message is scored against the same list. Never fails.
pub async fn generate_message(
    port: Option<&dyn ModelCallPort>,
    host: &AppState,
    settings: &GenerationSettings,
    agent: &Agent,
    seed_prompt: &str,
    context: &[Message],
) -> Message {
    let live = match port {
        Some(port) => generate_live(port, host, settings, agent, seed_prompt, context).await,
        None => None,
    };

    let message = match live {
        Some(message) => message,
        None => Message::from_agent(agent, generate_mock_response(agent, seed_prompt, context))
            .with_diagnostics(
                agent.provider_id.as_ref().map(|id| format!("Provider: {}", id)),
                agent.model_id.as_ref().map(|id| format!("Model: {}", id)),
            ),
    };

    let score = score_message(&message, context);
    debug!(
        "Generated {} message ({} chars, exploration {:.2})",
        agent.role(),
        message.content.len(),
        score.exploration_index
    );
    message.with_score(score)
}

/// Try the configured provider. `None` means "use the mock".
async fn generate_live(
    port: &dyn ModelCallPort,
    host: &AppState,
    settings: &GenerationSettings,
    agent: &Agent,
    seed_prompt: &str,
    context: &[Message],
) -> Option<Message> {
    let (Some(provider_id), Some(model_id)) = (&agent.provider_id, &agent.model_id) else {
        return None;
    };
    let Some(provider) = host.provider(provider_id) else {
        debug!("Provider {} of agent {} is not configured", provider_id, agent.id);
        return None;
    };

    // A model id that names no ModelConfig is taken as the model name itself
    let model_config = host.model(model_id);
    let model = model_config.map(|m| m.model.as_str()).unwrap_or(model_id.as_str());

    let call = ModelCall {
        provider,
        model,
        base_url_override: model_config.and_then(|m| m.base_url_override.as_deref()),
        secret: host.secret_for(provider),
        request: CompletionRequest {
            messages: build_prompt(agent, seed_prompt, context),
            temperature: agent.temperature.unwrap_or(settings.default_temperature),
            max_tokens: settings.max_tokens,
        },
        timeout: Duration::from_millis(host.settings.timeout_ms),
    };

    let result = port.call_model(call).await;
    match (result.success, result.content) {
        (true, Some(content)) => {
            if let Some(usage) = result.usage {
                debug!("{} used {} tokens", provider.name, usage.total_tokens);
            }
            Some(
                Message::from_agent(agent, content).with_diagnostics(
                    Some(format!("Provider: {}", provider.name)),
                    Some(format!("Model: {}", model)),
                ),
            )
        }
        _ => {
            info!(
                "Agent {} falls back to mock after {} returned {}",
                agent.id,
                provider.name,
                result.error.as_deref().unwrap_or("an empty response")
            );
            None
        }
    }
}

/// System persona plus one user message carrying the transcript
pub fn build_prompt(agent: &Agent, seed_prompt: &str, context: &[Message]) -> Vec<ChatMessage> {
    let role = agent.role();
    let system = format!(
        "{}\n\nThe session is exploring: {}",
        Persona::for_role(role).instructions(),
        seed_prompt
    );

    let transcript = if context.is_empty() {
        "(no messages yet)".to_string()
    } else {
        context
            .iter()
            .map(|m| format!("{}: {}", m.role.label(), m.content))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let user = format!(
        "Seed prompt: {}\n\nConversation so far:\n{}\n\nRespond as the {} agent.",
        seed_prompt,
        transcript,
        role.label()
    );

    vec![ChatMessage::system(system), ChatMessage::user(user)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::llm::{ChatRole, ModelCallResult, TokenUsage};
    use crate::domain::{AgentRole, ModelConfig, Secret};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records calls and answers with a fixed result
    struct ScriptedPort {
        result: ModelCallResult,
        calls: Mutex<Vec<(String, String, f32, u32)>>,
    }

    impl ScriptedPort {
        fn new(result: ModelCallResult) -> Self {
            Self {
                result,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ModelCallPort for ScriptedPort {
        async fn call_model(&self, call: ModelCall<'_>) -> ModelCallResult {
            self.calls.lock().unwrap().push((
                call.provider.id.clone(),
                call.model.to_string(),
                call.request.temperature,
                call.request.max_tokens,
            ));
            self.result.clone()
        }
    }

    fn success(content: &str) -> ModelCallResult {
        ModelCallResult {
            success: true,
            content: Some(content.to_string()),
            error: None,
            usage: Some(TokenUsage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            }),
        }
    }

    fn host_with_model() -> AppState {
        let mut host = AppState::default();
        host.upsert_model(ModelConfig {
            id: "cfg-1".to_string(),
            provider_id: "openai".to_string(),
            model: "gpt-4-turbo".to_string(),
            label: "Turbo".to_string(),
            temperature: Some(1.5),
            top_p: None,
            max_tokens: None,
            base_url_override: None,
            assigned_team: None,
        });
        host.secrets.push(Secret {
            alias: "OPENAI_API_KEY".to_string(),
            value_encrypted: "age:irrelevant".to_string(),
        });
        host
    }

    #[tokio::test]
    async fn test_without_binding_uses_mock() {
        let port = ScriptedPort::new(success("live"));
        let agent = Agent::new("agent-red", "Red Agent", AgentRole::Red);
        let message = generate_message(
            Some(&port),
            &AppState::default(),
            &GenerationSettings::default(),
            &agent,
            "seed",
            &[],
        )
        .await;

        assert!(port.calls.lock().unwrap().is_empty());
        assert!(message.content.starts_with("Building on the seed prompt"));
        assert!(message.api_endpoint.is_none());
        assert!(message.score.is_some());
    }

    #[tokio::test]
    async fn test_live_success_resolves_model_config() {
        let port = ScriptedPort::new(success("A live answer"));
        let agent = Agent::new("agent-blue", "Blue Agent", AgentRole::Blue).with_model("openai", "cfg-1");
        let message = generate_message(
            Some(&port),
            &host_with_model(),
            &GenerationSettings::default(),
            &agent,
            "seed",
            &[],
        )
        .await;

        assert_eq!(message.content, "A live answer");
        assert_eq!(message.api_endpoint.as_deref(), Some("Provider: OpenAI"));
        assert_eq!(message.request_body.as_deref(), Some("Model: gpt-4-turbo"));

        let calls = port.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        // agent temperature unset: the default applies, not the model config's
        assert_eq!(calls[0], ("openai".to_string(), "gpt-4-turbo".to_string(), 0.7, 1000));
    }

    #[tokio::test]
    async fn test_failure_falls_back_with_id_diagnostics() {
        let port = ScriptedPort::new(ModelCallResult {
            success: false,
            content: None,
            error: Some("API error: 500 - boom".to_string()),
            usage: None,
        });
        let agent = Agent::new("agent-purple", "Purple Agent", AgentRole::Purple)
            .with_temperature(0.2)
            .with_model("openai", "gpt-4");
        let message = generate_message(
            Some(&port),
            &host_with_model(),
            &GenerationSettings::default(),
            &agent,
            "seed",
            &[],
        )
        .await;

        assert!(message.content.starts_with("Synthesizing"));
        assert_eq!(message.api_endpoint.as_deref(), Some("Provider: openai"));
        assert_eq!(message.request_body.as_deref(), Some("Model: gpt-4"));
        assert_eq!(port.calls.lock().unwrap()[0].2, 0.2);
    }

    #[tokio::test]
    async fn test_unknown_provider_skips_call() {
        let port = ScriptedPort::new(success("live"));
        let agent = Agent::new("agent-red", "Red Agent", AgentRole::Red).with_model("nowhere", "m");
        let message = generate_message(
            Some(&port),
            &AppState::default(),
            &GenerationSettings::default(),
            &agent,
            "seed",
            &[],
        )
        .await;
        assert!(port.calls.lock().unwrap().is_empty());
        assert_eq!(message.api_endpoint.as_deref(), Some("Provider: nowhere"));
    }

    #[test]
    fn test_build_prompt_includes_transcript() {
        let red = Agent::new("agent-red", "Red Agent", AgentRole::Red);
        let blue = Agent::new("agent-blue", "Blue Agent", AgentRole::Blue);
        let context = vec![Message::from_agent(&red, "Idea one")];

        let prompt = build_prompt(&blue, "cities", &context);
        assert_eq!(prompt.len(), 2);
        assert_eq!(prompt[0].role, ChatRole::System);
        assert!(prompt[0].content.contains("Blue agent"));
        assert!(prompt[1].content.contains("Red: Idea one"));
        assert!(prompt[1].content.ends_with("Respond as the Blue agent."));
    }
}
