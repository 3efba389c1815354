use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub mod validator;

use crate::adapters::storage::{StateStore, DEFAULT_STORAGE_KEY};
use crate::arena::{EngineSettings, GenerationSettings};
use crate::cli::Cli;
use crate::domain::{AppState, Provider, DEFAULT_SEED_PROMPT};
use crate::persistence::PersistenceConfig;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub arena: ArenaSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub database: PersistenceConfig,
    /// Providers added to (or replacing) the built-in catalog
    #[serde(default)]
    pub providers: Vec<Provider>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Passphrase sealing API keys stored by the stub server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ArenaSettings {
    #[serde(default = "default_seed_prompt")]
    pub seed_prompt: String,
    #[serde(default = "default_inter_turn_delay_ms")]
    pub inter_turn_delay_ms: u64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,
}

fn default_seed_prompt() -> String {
    DEFAULT_SEED_PROMPT.to_string()
}

fn default_inter_turn_delay_ms() -> u64 {
    2000
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_temperature() -> f32 {
    0.7
}

impl Default for ArenaSettings {
    fn default() -> Self {
        Self {
            seed_prompt: default_seed_prompt(),
            inter_turn_delay_ms: default_inter_turn_delay_ms(),
            max_tokens: default_max_tokens(),
            default_temperature: default_temperature(),
        }
    }
}

impl ArenaSettings {
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            generation: GenerationSettings {
                default_temperature: self.default_temperature,
                max_tokens: self.max_tokens,
            },
            inter_turn_delay: Duration::from_millis(self.inter_turn_delay_ms),
        }
    }
}

/// Location of the local application-state snapshot
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default = "default_storage_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_storage_key")]
    pub key: String,
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from(".gaunt")
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            dir: default_storage_dir(),
            key: default_storage_key(),
        }
    }
}

impl StorageSettings {
    pub fn state_store(&self) -> StateStore {
        StateStore::new(&self.dir, &self.key)
    }
}

impl Settings {
    pub fn new() -> Result<Self, anyhow::Error> {
        Self::from_root(".")
    }

    /// Create settings from CLI arguments (includes config file and CLI overrides)
    pub fn new_with_cli(cli: &Cli) -> Result<Self, anyhow::Error> {
        let config_path = &cli.config;
        let root = config_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut settings = Self::build(File::from(config_path.clone()).required(false))?;

        // CLI > env vars > config file
        settings.apply_cli_overrides(cli);
        settings.load_external_configs(root)?;
        settings.validate()?;

        Ok(settings)
    }

    /// Load `<root>/gaunt.{toml,yaml,json}` plus `<root>/config/providers/*`
    pub fn from_root(root: impl AsRef<Path>) -> Result<Self, anyhow::Error> {
        let root = root.as_ref();
        let mut settings = Self::build(File::from(root.join("gaunt")).required(false))?;

        settings.load_external_configs(root)?;
        settings.validate()?;

        Ok(settings)
    }

    fn build<S>(file: S) -> Result<Self, anyhow::Error>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let s = Config::builder()
            .add_source(file)
            .add_source(Environment::with_prefix("GAUNT").separator("__"))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 4000)?
            .build()?;

        Ok(s.try_deserialize()?)
    }

    fn validate(&self) -> Result<(), anyhow::Error> {
        validator::ConfigValidator::validate(self).map_err(|errors| {
            let error_messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            anyhow::anyhow!(
                "Configuration validation failed:\n{}",
                error_messages.join("\n")
            )
        })
    }

    fn apply_cli_overrides(&mut self, cli: &Cli) {
        if let Some(host) = &cli.host {
            self.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            self.server.port = port;
        }
        if let Some(dir) = &cli.storage_dir {
            self.storage.dir = dir.clone();
        }
    }

    fn load_external_configs(&mut self, root: &Path) -> Result<(), anyhow::Error> {
        self.load_providers_from_dir(&root.join("config").join("providers"))
    }

    fn load_providers_from_dir(&mut self, path: &Path) -> Result<(), anyhow::Error> {
        let pattern = format!("{}/*", path.display());
        for entry in glob::glob(&pattern)? {
            match entry {
                Ok(path) => {
                    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
                        if matches!(ext, "json" | "yaml" | "yml") {
                            let content = std::fs::read_to_string(&path)?;
                            let provider: Provider = if ext == "json" {
                                serde_json::from_str(&content)?
                            } else {
                                serde_yaml::from_str(&content)?
                            };
                            tracing::debug!("Loaded provider {} from {}", provider.id, path.display());
                            self.providers.push(provider);
                        }
                    }
                }
                Err(e) => tracing::warn!("Failed to read glob entry: {}", e),
            }
        }
        Ok(())
    }

    /// Merge the configured providers into `state`, replacing same-id entries
    pub fn apply_providers(&self, state: &mut AppState) {
        for provider in &self.providers {
            state.upsert_provider(provider.clone());
        }
    }
}
