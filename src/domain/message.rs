//! Arena messages and their heuristic scores

use serde::{Deserialize, Serialize};

use super::{now_millis, Agent, AgentRole};

/// Five-axis heuristic score, every axis in [0, 100]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    pub novelty: f64,
    pub feasibility: f64,
    pub value_impact: f64,
    pub safety: f64,
    pub exploration_index: f64,
}

impl Score {
    pub const ZERO: Score = Score {
        novelty: 0.0,
        feasibility: 0.0,
        value_impact: 0.0,
        safety: 0.0,
        exploration_index: 0.0,
    };

    /// Axes in export column order
    pub fn axes(&self) -> [f64; 5] {
        [
            self.novelty,
            self.feasibility,
            self.value_impact,
            self.safety,
            self.exploration_index,
        ]
    }
}

/// A message produced by an agent.
///
/// Messages are never edited after they are appended to a session; the
/// score and diagnostics are attached while the message is being built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub agent_id: String,
    /// Role copied from the agent at creation time
    pub role: AgentRole,
    pub content: String,
    /// Unix epoch milliseconds
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<Score>,
    /// Diagnostic label of the provider that produced the content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_endpoint: Option<String>,
    /// Diagnostic label of the model that produced the content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<String>,
}

impl Message {
    /// Create a message authored by `agent`
    pub fn from_agent(agent: &Agent, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            agent_id: agent.id.clone(),
            role: agent.role(),
            content: content.into(),
            timestamp: now_millis(),
            score: None,
            api_endpoint: None,
            request_body: None,
        }
    }

    pub fn with_score(mut self, score: Score) -> Self {
        self.score = Some(score);
        self
    }

    pub fn with_diagnostics(mut self, api_endpoint: Option<String>, request_body: Option<String>) -> Self {
        self.api_endpoint = api_endpoint;
        self.request_body = request_body;
        self
    }
}
