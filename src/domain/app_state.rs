//! Application state snapshot: admin configuration plus saved sessions

use serde::{Deserialize, Serialize};

use super::catalog::default_providers;
use super::{ModelConfig, Provider, Secret, Session};

/// Language of a stored connector snippet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectorLanguage {
    Python,
    Javascript,
}

/// User-authored connector code kept alongside the configuration.
/// The arena never executes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorCode {
    pub id: String,
    pub language: ConnectorLanguage,
    pub label: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_test_result: Option<String>,
}

/// Global application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_provider_id: Option<String>,
    #[serde(default)]
    pub telemetry: bool,
    /// Provider request timeout
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    30_000
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            default_provider_id: None,
            telemetry: false,
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// Everything persisted between runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    #[serde(default)]
    pub providers: Vec<Provider>,
    #[serde(default)]
    pub models: Vec<ModelConfig>,
    #[serde(default)]
    pub secrets: Vec<Secret>,
    #[serde(default)]
    pub connectors: Vec<ConnectorCode>,
    #[serde(default)]
    pub settings: AppSettings,
    #[serde(default)]
    pub sessions: Vec<Session>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_session_id: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            providers: default_providers(),
            models: Vec::new(),
            secrets: Vec::new(),
            connectors: Vec::new(),
            settings: AppSettings::default(),
            sessions: Vec::new(),
            current_session_id: None,
        }
    }
}

impl AppState {
    pub fn provider(&self, id: &str) -> Option<&Provider> {
        self.providers.iter().find(|p| p.id == id)
    }

    pub fn model(&self, id: &str) -> Option<&ModelConfig> {
        self.models.iter().find(|m| m.id == id)
    }

    /// Secret whose alias matches the provider's credential alias
    pub fn secret_for(&self, provider: &Provider) -> Option<&Secret> {
        self.secrets.iter().find(|s| s.alias == provider.api_key_alias)
    }

    /// A model is usable when its provider exists and has a stored secret
    pub fn is_model_usable(&self, model: &ModelConfig) -> bool {
        self.provider(&model.provider_id)
            .map(|p| self.secret_for(p).is_some())
            .unwrap_or(false)
    }

    /// Insert or replace a provider (matched by id)
    pub fn upsert_provider(&mut self, provider: Provider) {
        match self.providers.iter_mut().find(|p| p.id == provider.id) {
            Some(existing) => *existing = provider,
            None => self.providers.push(provider),
        }
    }

    /// Remove a provider together with the models bound to it
    pub fn remove_provider(&mut self, id: &str) -> bool {
        let before = self.providers.len();
        self.providers.retain(|p| p.id != id);
        self.models.retain(|m| m.provider_id != id);
        self.providers.len() != before
    }

    /// Insert or replace a model configuration (matched by id)
    pub fn upsert_model(&mut self, model: ModelConfig) {
        match self.models.iter_mut().find(|m| m.id == model.id) {
            Some(existing) => *existing = model,
            None => self.models.push(model),
        }
    }

    pub fn remove_model(&mut self, id: &str) -> bool {
        let before = self.models.len();
        self.models.retain(|m| m.id != id);
        self.models.len() != before
    }

    /// Replace the model list of a provider with freshly discovered names
    pub fn set_discovered_models(&mut self, provider_id: &str, models: Vec<String>) -> bool {
        match self.providers.iter_mut().find(|p| p.id == provider_id) {
            Some(provider) => {
                provider.models = models;
                true
            }
            None => false,
        }
    }

    /// Store a session, replacing any earlier copy, and mark it current
    pub fn save_session(&mut self, session: Session) {
        self.current_session_id = Some(session.id.clone());
        match self.sessions.iter_mut().find(|s| s.id == session.id) {
            Some(existing) => *existing = session,
            None => self.sessions.push(session),
        }
    }

    pub fn current_session(&self) -> Option<&Session> {
        let id = self.current_session_id.as_deref()?;
        self.sessions.iter().find(|s| s.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(id: &str, provider_id: &str) -> ModelConfig {
        ModelConfig {
            id: id.to_string(),
            provider_id: provider_id.to_string(),
            model: "gpt-4".to_string(),
            label: "GPT-4".to_string(),
            temperature: None,
            top_p: None,
            max_tokens: None,
            base_url_override: None,
            assigned_team: None,
        }
    }

    #[test]
    fn test_default_state_has_catalog() {
        let state = AppState::default();
        assert!(state.provider("openai").is_some());
        assert!(state.provider("anthropic").is_some());
        assert_eq!(state.settings.timeout_ms, 30_000);
        assert!(!state.settings.telemetry);
    }

    #[test]
    fn test_model_usable_only_with_secret() {
        let mut state = AppState::default();
        let m = model("m1", "openai");
        state.upsert_model(m.clone());
        assert!(!state.is_model_usable(&m));

        state.secrets.push(Secret {
            alias: "OPENAI_API_KEY".to_string(),
            value_encrypted: "age:xyz".to_string(),
        });
        assert!(state.is_model_usable(&m));
    }

    #[test]
    fn test_remove_provider_drops_its_models() {
        let mut state = AppState::default();
        state.upsert_model(model("m1", "openai"));
        state.upsert_model(model("m2", "anthropic"));
        assert!(state.remove_provider("openai"));
        assert!(state.model("m1").is_none());
        assert!(state.model("m2").is_some());
        assert!(!state.remove_provider("openai"));
    }

    #[test]
    fn test_missing_fields_deserialize_to_defaults() {
        let state: AppState = serde_json::from_str("{}").unwrap();
        assert!(state.providers.is_empty());
        assert_eq!(state.settings.timeout_ms, 30_000);
    }
}
