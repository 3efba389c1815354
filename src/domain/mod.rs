//! Core domain types of the arena

pub mod agent;
pub mod app_state;
pub mod catalog;
pub mod message;
pub mod provider;
pub mod session;

pub use agent::{default_agents, Agent, AgentRole, AgentUpdate};
pub use app_state::{AppSettings, AppState, ConnectorCode, ConnectorLanguage};
pub use message::{Message, Score};
pub use provider::{AssignedTeam, ModelConfig, Provider, ProviderType, Secret};
pub use session::{can_execute_turn, Session, SessionStatus, DEFAULT_SEED_PROMPT};

/// Current time as Unix epoch milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
