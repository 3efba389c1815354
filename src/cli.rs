use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::adapters::export::ExportFormat;
use crate::domain::AssignedTeam;

/// Gaunt Arena - Red/Blue/Purple multi-agent creative exploration
#[derive(Parser, Debug, Clone)]
#[command(name = "gaunt", version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "GAUNT_CONFIG", default_value = "gaunt.toml")]
    pub config: PathBuf,

    /// Server host address
    #[arg(long, env = "GAUNT_HOST")]
    pub host: Option<String>,

    /// Server port
    #[arg(long, env = "GAUNT_PORT")]
    pub port: Option<u16>,

    /// Directory holding the application-state snapshot
    #[arg(long, env = "GAUNT_STORAGE_DIR")]
    pub storage_dir: Option<PathBuf>,

    /// Passphrase unlocking stored API keys. Without it every agent uses mock responses.
    #[arg(long, env = "GAUNT_SECRET_PASSPHRASE", hide_env_values = true)]
    pub secret_passphrase: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Run Red, Blue, Purple cycles on the current session
    Run {
        /// Number of cycles; ignored with --continuous
        #[arg(long, default_value_t = 1)]
        cycles: u32,

        /// Keep cycling until interrupted with Ctrl-C
        #[arg(long)]
        continuous: bool,

        /// Replace the seed prompt before running
        #[arg(long)]
        prompt: Option<String>,

        /// Bind agents to the models assigned to their team
        #[arg(long)]
        assign_teams: bool,
    },

    /// Generate one message for a single agent
    Agent {
        /// Agent id, e.g. agent-red
        agent_id: String,

        /// Bind the agent to a model config before generating
        #[arg(long)]
        model: Option<String>,

        /// Override the agent's sampling temperature (0-2)
        #[arg(long)]
        temperature: Option<f32>,
    },

    /// Discard the current session
    Reset,

    /// Serve the provider-config REST API
    Serve,

    /// Encrypt a value with the secret passphrase and print the blob
    EncryptSecret {
        value: String,
    },

    /// Manage stored API keys
    Secret {
        #[command(subcommand)]
        action: SecretAction,
    },

    /// Manage model configs and their team assignments
    Model {
        #[command(subcommand)]
        action: ModelAction,
    },

    /// Manage configured providers
    Provider {
        #[command(subcommand)]
        action: ProviderAction,
    },

    /// Export the current session, or the whole state encrypted
    Export {
        #[arg(long, default_value = "json")]
        format: ExportFormat,

        /// Export the encrypted application state instead of the session
        #[arg(long)]
        state: bool,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum SecretAction {
    /// Store an API key under an alias, replacing any previous one
    Set {
        /// Alias matched against a provider's api key alias, e.g. OPENAI_API_KEY
        alias: String,
        value: String,
    },

    /// List stored aliases and the providers using them
    List,

    /// Delete a stored API key
    Remove { alias: String },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum ModelAction {
    /// Add a model config for a provider with a stored key
    Add {
        provider_id: String,
        model: String,

        /// Display label; defaults to the model name
        #[arg(long)]
        label: Option<String>,

        /// Team the model plays for (red, blue, purple, none)
        #[arg(long)]
        team: Option<AssignedTeam>,

        #[arg(long)]
        temperature: Option<f32>,

        #[arg(long)]
        base_url: Option<String>,
    },

    /// List model configs
    List,

    /// Assign a model config to a team
    Assign { id: String, team: AssignedTeam },

    /// Delete a model config
    Remove { id: String },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum ProviderAction {
    /// List providers and whether a key is stored for them
    List,

    /// Refresh a provider's model list from the built-in catalog
    DiscoverModels { provider_id: String },

    /// Delete a provider and its model configs
    Remove { id: String },
}
