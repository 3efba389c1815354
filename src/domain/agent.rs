//! Agent identities and the fixed arena roles

use serde::{Deserialize, Serialize};

/// Role an agent plays in the arena.
///
/// The role decides both where the agent sits in the turn order and which
/// persona its responses carry. It never changes once an agent is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentRole {
    /// A human participant (never scheduled by the turn engine)
    Human,
    /// Divergent, adversarial thinker
    Red,
    /// Evaluator focused on constraints and risk
    Blue,
    /// Integrator that synthesizes Red and Blue
    Purple,
}

impl AgentRole {
    /// Roles scheduled by a turn cycle, in execution order
    pub const TURN_ORDER: [AgentRole; 3] = [AgentRole::Red, AgentRole::Blue, AgentRole::Purple];

    /// Lowercase identifier used in exports and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentRole::Human => "human",
            AgentRole::Red => "red",
            AgentRole::Blue => "blue",
            AgentRole::Purple => "purple",
        }
    }

    /// Display label ("Red", "Blue", ...)
    pub fn label(&self) -> &'static str {
        match self {
            AgentRole::Human => "Human",
            AgentRole::Red => "Red",
            AgentRole::Blue => "Blue",
            AgentRole::Purple => "Purple",
        }
    }
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A participant of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: String,
    pub name: String,
    role: AgentRole,
    /// Bound model configuration (id of a `ModelConfig`, or a raw model name)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    /// Bound provider id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
    /// Sampling temperature (0-2)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl Agent {
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: AgentRole) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role,
            model_id: None,
            provider_id: None,
            temperature: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Bind a provider and model to this agent
    pub fn with_model(mut self, provider_id: impl Into<String>, model_id: impl Into<String>) -> Self {
        self.provider_id = Some(provider_id.into());
        self.model_id = Some(model_id.into());
        self
    }

    pub fn role(&self) -> AgentRole {
        self.role
    }

    /// Apply an update. The role is not part of `AgentUpdate` and stays fixed.
    pub fn apply(&mut self, update: AgentUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(model_id) = update.model_id {
            self.model_id = model_id;
        }
        if let Some(provider_id) = update.provider_id {
            self.provider_id = provider_id;
        }
        if let Some(temperature) = update.temperature {
            self.temperature = temperature.map(|t| t.clamp(0.0, 2.0));
        }
    }
}

/// Partial update of an agent.
///
/// The outer `Option` means "leave unchanged"; an inner `None` clears the field.
#[derive(Debug, Clone, Default)]
pub struct AgentUpdate {
    pub name: Option<String>,
    pub model_id: Option<Option<String>>,
    pub provider_id: Option<Option<String>>,
    pub temperature: Option<Option<f32>>,
}

/// Agents seeded into a freshly started session
pub fn default_agents() -> Vec<Agent> {
    vec![
        Agent::new("agent-red", "Red Agent", AgentRole::Red).with_temperature(0.9),
        Agent::new("agent-blue", "Blue Agent", AgentRole::Blue).with_temperature(0.5),
        Agent::new("agent-purple", "Purple Agent", AgentRole::Purple).with_temperature(0.7),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&AgentRole::Purple).unwrap(), "\"purple\"");
        let role: AgentRole = serde_json::from_str("\"red\"").unwrap();
        assert_eq!(role, AgentRole::Red);
    }

    #[test]
    fn test_update_keeps_role() {
        let mut agent = Agent::new("a", "Red Agent", AgentRole::Red);
        agent.apply(AgentUpdate {
            name: Some("Renamed".to_string()),
            model_id: Some(Some("gpt-4".to_string())),
            provider_id: Some(Some("openai".to_string())),
            temperature: Some(Some(3.5)),
        });
        assert_eq!(agent.role(), AgentRole::Red);
        assert_eq!(agent.name, "Renamed");
        assert_eq!(agent.model_id.as_deref(), Some("gpt-4"));
        assert_eq!(agent.temperature, Some(2.0));

        agent.apply(AgentUpdate {
            model_id: Some(None),
            ..Default::default()
        });
        assert!(agent.model_id.is_none());
        assert_eq!(agent.provider_id.as_deref(), Some("openai"));
    }

    #[test]
    fn test_default_agents_cover_turn_order() {
        let agents = default_agents();
        for role in AgentRole::TURN_ORDER {
            assert!(agents.iter().any(|a| a.role() == role));
        }
    }
}
