use std::collections::HashMap;
use thiserror::Error;

use crate::config::{ArenaSettings, ServerSettings, Settings, StorageSettings};
use crate::domain::Provider;
use crate::persistence::PersistenceConfig;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Duplicate entry: {0}")]
    Duplicate(String),
}

pub struct ConfigValidator;

impl ConfigValidator {
    /// Check every section, collecting all problems rather than stopping at the first
    pub fn validate(settings: &Settings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        errors.extend(Self::validate_server(&settings.server));
        errors.extend(Self::validate_arena(&settings.arena));
        errors.extend(Self::validate_storage(&settings.storage));
        errors.extend(Self::validate_database(&settings.database));
        errors.extend(Self::validate_providers(&settings.providers));

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_server(server: &ServerSettings) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if server.host.is_empty() {
            errors.push(ValidationError::MissingField("server.host".to_string()));
        }

        if server.port == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if server.secret_key.as_deref().is_some_and(str::is_empty) {
            errors.push(ValidationError::InvalidValue {
                field: "server.secret_key".to_string(),
                reason: "Secret key must not be empty when set".to_string(),
            });
        }

        errors
    }

    fn validate_arena(arena: &ArenaSettings) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if arena.seed_prompt.trim().is_empty() {
            errors.push(ValidationError::MissingField("arena.seed_prompt".to_string()));
        }

        if !(0.0..=2.0).contains(&arena.default_temperature) {
            errors.push(ValidationError::InvalidValue {
                field: "arena.default_temperature".to_string(),
                reason: "Temperature must be between 0 and 2".to_string(),
            });
        }

        if arena.max_tokens == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "arena.max_tokens".to_string(),
                reason: "max_tokens must be greater than 0".to_string(),
            });
        }

        errors
    }

    fn validate_storage(storage: &StorageSettings) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if storage.key.is_empty() {
            errors.push(ValidationError::MissingField("storage.key".to_string()));
        } else if storage.key.contains(['/', '\\']) {
            errors.push(ValidationError::InvalidValue {
                field: "storage.key".to_string(),
                reason: "Key must not contain path separators".to_string(),
            });
        }

        errors
    }

    fn validate_database(database: &PersistenceConfig) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if !database.url.starts_with("sqlite:") {
            errors.push(ValidationError::InvalidValue {
                field: "database.url".to_string(),
                reason: "Only sqlite: URLs are supported".to_string(),
            });
        }

        if database.max_connections == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "database.max_connections".to_string(),
                reason: "At least one connection is required".to_string(),
            });
        }

        errors
    }

    fn validate_providers(providers: &[Provider]) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let mut seen_ids = HashMap::new();

        for (idx, provider) in providers.iter().enumerate() {
            if let Some(prev_idx) = seen_ids.insert(&provider.id, idx) {
                errors.push(ValidationError::Duplicate(format!(
                    "Provider id '{}' appears at indices {} and {}",
                    provider.id, prev_idx, idx
                )));
            }

            if provider.id.is_empty() {
                errors.push(ValidationError::MissingField(format!("providers[{}].id", idx)));
            }

            if provider.api_key_alias.is_empty() {
                errors.push(ValidationError::MissingField(format!(
                    "providers[{}].api_key_alias",
                    idx
                )));
            }

            if let Some(url) = &provider.base_url {
                if !url.is_empty() && !(url.starts_with("http://") || url.starts_with("https://")) {
                    errors.push(ValidationError::InvalidValue {
                        field: format!("providers[{}].base_url", idx),
                        reason: "Base URL must start with http:// or https://".to_string(),
                    });
                }
            }
        }

        errors
    }
}
