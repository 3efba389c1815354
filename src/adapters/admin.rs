//! Provider, model and secret administration over the application state

use tracing::info;

use super::encryption;
use super::secrets::{SecretError, SecretVault};
use crate::domain::catalog::known_models;
use crate::domain::{AppState, AssignedTeam, ModelConfig};

/// Errors of admin edits
#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error("Provider not found: {0}")]
    ProviderNotFound(String),

    #[error("Model config not found: {0}")]
    ModelNotFound(String),

    /// The provider has no stored key under its alias
    #[error("No API key stored under {0}")]
    MissingCredential(String),

    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error(transparent)]
    Secret(#[from] SecretError),
}

/// Fields of a model config being added
#[derive(Debug, Clone, Default)]
pub struct NewModel {
    pub provider_id: String,
    pub model: String,
    /// Defaults to the model name
    pub label: Option<String>,
    pub team: Option<AssignedTeam>,
    pub temperature: Option<f32>,
    pub base_url_override: Option<String>,
}

/// Id given to a model config: `<provider>-<model>`
pub fn model_config_id(provider_id: &str, model: &str) -> String {
    format!("{}-{}", provider_id, model.replace('/', "-"))
}

/// Add or replace a model config. Only providers with a stored key accept models.
pub fn add_model(state: &mut AppState, new: NewModel) -> Result<ModelConfig, AdminError> {
    let model = new.model.trim();
    if model.is_empty() {
        return Err(AdminError::InvalidModel("model name is empty".to_string()));
    }
    if new.temperature.is_some_and(|t| !(0.0..=2.0).contains(&t)) {
        return Err(AdminError::InvalidModel("temperature must be between 0 and 2".to_string()));
    }

    let provider = state
        .provider(&new.provider_id)
        .ok_or_else(|| AdminError::ProviderNotFound(new.provider_id.clone()))?;
    if state.secret_for(provider).is_none() {
        return Err(AdminError::MissingCredential(provider.api_key_alias.clone()));
    }

    let config = ModelConfig {
        id: model_config_id(&provider.id, model),
        provider_id: provider.id.clone(),
        model: model.to_string(),
        label: new.label.unwrap_or_else(|| model.to_string()),
        temperature: new.temperature,
        top_p: None,
        max_tokens: None,
        base_url_override: new.base_url_override.filter(|url| !url.is_empty()),
        assigned_team: new.team,
    };
    state.upsert_model(config.clone());
    info!("Saved model config {}", config.id);
    Ok(config)
}

pub fn remove_model(state: &mut AppState, id: &str) -> Result<(), AdminError> {
    if !state.remove_model(id) {
        return Err(AdminError::ModelNotFound(id.to_string()));
    }
    info!("Removed model config {}", id);
    Ok(())
}

/// Assign a model config to a team; `AssignedTeam::None` clears it
pub fn assign_team(state: &mut AppState, id: &str, team: AssignedTeam) -> Result<(), AdminError> {
    let model = state
        .models
        .iter_mut()
        .find(|m| m.id == id)
        .ok_or_else(|| AdminError::ModelNotFound(id.to_string()))?;
    model.assigned_team = Some(team);
    info!("Model config {} assigned to {:?}", id, team);
    Ok(())
}

/// Remove a provider and every model config bound to it
pub fn remove_provider(state: &mut AppState, id: &str) -> Result<(), AdminError> {
    if !state.remove_provider(id) {
        return Err(AdminError::ProviderNotFound(id.to_string()));
    }
    info!("Removed provider {}", id);
    Ok(())
}

/// Refresh a provider's model list from the catalog.
///
/// Discovery does not query the provider; it needs a stored key like the
/// real lookup would.
pub fn discover_models(state: &mut AppState, provider_id: &str) -> Result<Vec<String>, AdminError> {
    let provider = state
        .provider(provider_id)
        .ok_or_else(|| AdminError::ProviderNotFound(provider_id.to_string()))?;
    if state.secret_for(provider).is_none() {
        return Err(AdminError::MissingCredential(provider.api_key_alias.clone()));
    }

    let models = known_models(&provider.slug);
    state.set_discovered_models(provider_id, models.clone());
    info!("Found {} models for {}", models.len(), provider_id);
    Ok(models)
}

/// A provider as listed by the admin commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEntry {
    pub id: String,
    pub name: String,
    pub has_key: bool,
    pub models: Vec<String>,
}

pub fn list_providers(state: &mut AppState) -> Vec<ProviderEntry> {
    let vault = SecretVault::new(&mut state.secrets);
    state
        .providers
        .iter()
        .map(|p| ProviderEntry {
            id: p.id.clone(),
            name: p.name.clone(),
            has_key: vault.has_secret_for(p),
            models: p.models.clone(),
        })
        .collect()
}

/// A stored secret as listed by the admin commands; never the value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretEntry {
    pub alias: String,
    /// Providers whose key alias matches
    pub providers: Vec<String>,
    /// False for values stored without the encryption envelope
    pub sealed: bool,
}

pub fn list_secrets(state: &mut AppState) -> Vec<SecretEntry> {
    let vault = SecretVault::new(&mut state.secrets);
    let aliases = vault.aliases();
    aliases
        .into_iter()
        .map(|alias| SecretEntry {
            providers: state
                .providers
                .iter()
                .filter(|p| p.api_key_alias == alias)
                .map(|p| p.id.clone())
                .collect(),
            sealed: state
                .secrets
                .iter()
                .any(|s| s.alias == alias && encryption::is_encrypted(&s.value_encrypted)),
            alias,
        })
        .collect()
}

pub fn remove_secret(state: &mut AppState, alias: &str) -> Result<(), AdminError> {
    if !SecretVault::new(&mut state.secrets).remove(alias) {
        return Err(SecretError::NotFound(alias.to_string()).into());
    }
    Ok(())
}
