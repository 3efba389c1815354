//! Arena sessions

use serde::{Deserialize, Serialize};

use super::{now_millis, Agent, AgentRole, AgentUpdate, Message};

pub const DEFAULT_SEED_PROMPT: &str =
    "Explore innovative solutions for sustainable urban transportation";

/// Lifecycle status of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    #[default]
    Idle,
    Running,
    Paused,
    Completed,
}

/// One exploration run: participants, steering prompt and message history.
///
/// The message list is append-only. It is only reachable through
/// [`Session::messages`] and [`Session::push_message`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub seed_prompt: String,
    pub agents: Vec<Agent>,
    messages: Vec<Message>,
    pub current_turn: u32,
    pub status: SessionStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Session {
    pub fn new(seed_prompt: impl Into<String>, agents: Vec<Agent>) -> Self {
        let now = now_millis();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            seed_prompt: seed_prompt.into(),
            agents,
            messages: Vec::new(),
            current_turn: 0,
            status: SessionStatus::Idle,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Append a message to the history
    pub fn push_message(&mut self, message: Message) {
        self.messages.push(message);
        self.touch();
    }

    /// True when every role of the turn order has at least one agent
    pub fn can_execute_turn(&self) -> bool {
        can_execute_turn(&self.agents)
    }

    /// First agent bound to `role`
    pub fn agent_for_role(&self, role: AgentRole) -> Option<&Agent> {
        self.agents.iter().find(|a| a.role() == role)
    }

    pub fn agent(&self, agent_id: &str) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == agent_id)
    }

    /// Update an agent in place. Returns false when no agent has that id.
    pub fn update_agent(&mut self, agent_id: &str, update: AgentUpdate) -> bool {
        let Some(agent) = self.agents.iter_mut().find(|a| a.id == agent_id) else {
            return false;
        };
        agent.apply(update);
        self.touch();
        true
    }

    /// Replace the agent with the same id, or add it as a new participant
    pub fn upsert_agent(&mut self, agent: Agent) {
        match self.agents.iter_mut().find(|a| a.id == agent.id) {
            Some(existing) => *existing = agent,
            None => self.agents.push(agent),
        }
        self.touch();
    }

    pub fn set_seed_prompt(&mut self, prompt: impl Into<String>) {
        self.seed_prompt = prompt.into();
        self.touch();
    }

    pub fn set_status(&mut self, status: SessionStatus) {
        self.status = status;
        self.touch();
    }

    /// Count one finished (or partially finished) turn cycle
    pub fn complete_cycle(&mut self) {
        self.current_turn += 1;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = now_millis();
    }
}

/// Whether `agents` cover every role of the turn order
pub fn can_execute_turn(agents: &[Agent]) -> bool {
    AgentRole::TURN_ORDER
        .iter()
        .all(|role| agents.iter().any(|a| a.role() == *role))
}
