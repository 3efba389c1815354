//! Provider, model and secret configuration

use serde::{Deserialize, Serialize};

use super::AgentRole;

/// Provider family.
///
/// Unknown strings are kept as [`ProviderType::Other`] so a provider loaded
/// from disk is never rejected at parse time; it fails at call time instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProviderType {
    Direct,
    OpenRouter,
    Bedrock,
    Azure,
    Other(String),
}

impl ProviderType {
    pub fn as_str(&self) -> &str {
        match self {
            ProviderType::Direct => "direct",
            ProviderType::OpenRouter => "openrouter",
            ProviderType::Bedrock => "bedrock",
            ProviderType::Azure => "azure",
            ProviderType::Other(other) => other,
        }
    }
}

impl From<String> for ProviderType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "direct" => ProviderType::Direct,
            "openrouter" => ProviderType::OpenRouter,
            "bedrock" => ProviderType::Bedrock,
            "azure" => ProviderType::Azure,
            _ => ProviderType::Other(value),
        }
    }
}

impl From<ProviderType> for String {
    fn from(value: ProviderType) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for ProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An API endpoint family and the alias of its credential
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(rename = "type")]
    pub provider_type: ProviderType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default)]
    pub models: Vec<String>,
    pub api_key_alias: String,
    #[serde(default)]
    pub get_key_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Team a model is assigned to in the admin screens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignedTeam {
    Red,
    Blue,
    Purple,
    None,
}

impl std::str::FromStr for AssignedTeam {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "red" => Ok(AssignedTeam::Red),
            "blue" => Ok(AssignedTeam::Blue),
            "purple" => Ok(AssignedTeam::Purple),
            "none" => Ok(AssignedTeam::None),
            other => Err(format!("Unknown team: {}", other)),
        }
    }
}

impl AssignedTeam {
    pub fn matches(&self, role: AgentRole) -> bool {
        matches!(
            (self, role),
            (AssignedTeam::Red, AgentRole::Red)
                | (AssignedTeam::Blue, AgentRole::Blue)
                | (AssignedTeam::Purple, AgentRole::Purple)
        )
    }
}

/// A concrete model bound to a provider, with sampling defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelConfig {
    pub id: String,
    pub provider_id: String,
    pub model: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url_override: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_team: Option<AssignedTeam>,
}

/// Encrypted credential keyed by alias
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Secret {
    pub alias: String,
    pub value_encrypted: String,
}
