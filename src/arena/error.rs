//! Error types for the arena engine and the model-call adapter

use thiserror::Error;

/// Errors that abort a turn before anything is generated
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TurnError {
    /// The session lacks an agent for at least one scheduled role
    #[error("Missing participants: a turn needs a red, a blue and a purple agent")]
    MissingParticipants,

    /// Manual execution named an agent that is not in the session
    #[error("Agent not found: {0}")]
    AgentNotFound(String),

    #[error("No active session")]
    NoActiveSession,
}

/// Errors produced while calling a provider.
///
/// None of these escape the generator: every variant is logged and replaced
/// by mock output.
#[derive(Debug, Error)]
pub enum CallError {
    /// No secret for the provider's alias, or it could not be decrypted
    #[error("API key not found or could not be decrypted")]
    CredentialUnavailable,

    /// Provider type outside the supported request shapes
    #[error("Unsupported provider type: {0}")]
    UnsupportedProviderType(String),

    /// Provider or model configuration cannot produce a request
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Non-success HTTP status
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Connection or transport failure
    #[error("Network error: {0}")]
    Network(String),

    /// Response body did not have the expected shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// Request timed out
    #[error("Request timed out")]
    Timeout,
}

impl CallError {
    /// Network, HTTP status and parse failures
    pub fn is_provider_call_failure(&self) -> bool {
        matches!(
            self,
            CallError::Api { .. } | CallError::Network(_) | CallError::Parse(_) | CallError::Timeout
        )
    }
}

impl From<reqwest::Error> for CallError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CallError::Timeout
        } else if err.is_connect() {
            CallError::Network(format!("Connection error: {}", err))
        } else if err.is_decode() {
            CallError::Parse(err.to_string())
        } else {
            CallError::Network(err.to_string())
        }
    }
}

/// Result type alias for provider calls
pub type LlmResult<T> = Result<T, CallError>;
