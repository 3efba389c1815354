//! Headless arena driver
//!
//! Owns the application state and the current session, and exposes the
//! operations a front end needs: start, pause, reset, prompt and agent edits,
//! manual single-agent turns.

use tracing::info;

use super::control::TurnControl;
use super::engine::{RunSummary, TurnEngine, TurnEvent};
use super::error::TurnError;
use crate::adapters::storage::StateStore;
use crate::domain::{default_agents, AgentRole, AgentUpdate, AppState, Message, Session, SessionStatus};

pub struct Arena {
    engine: TurnEngine,
    state: AppState,
    session: Option<Session>,
    seed_prompt: String,
}

impl Arena {
    /// Driver over `state`, resuming its current session if it has one
    pub fn new(engine: TurnEngine, state: AppState, seed_prompt: impl Into<String>) -> Self {
        let mut session = state.current_session().cloned();
        // No run survives the process that started it
        if let Some(s) = session.as_mut().filter(|s| s.status == SessionStatus::Running) {
            info!("Session {} was saved mid-run, resuming from idle", s.id);
            s.set_status(SessionStatus::Idle);
        }
        Self {
            engine,
            state,
            session,
            seed_prompt: seed_prompt.into(),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Start or resume the session and run cycles until stopped or
    /// `max_cycles` is reached.
    ///
    /// A new session with the default agents is created when none exists.
    pub async fn start<F>(
        &mut self,
        control: &mut TurnControl,
        max_cycles: Option<u32>,
        observer: F,
    ) -> Result<RunSummary, TurnError>
    where
        F: FnMut(&TurnEvent) + Send,
    {
        let seed_prompt = &self.seed_prompt;
        let session = self.session.get_or_insert_with(|| new_session(seed_prompt));

        self.engine
            .run_cycles(session, &self.state, control, max_cycles, observer)
            .await
    }

    /// Current session, created with the default agents if there is none
    pub fn open_session(&mut self) -> &Session {
        let seed_prompt = &self.seed_prompt;
        self.session.get_or_insert_with(|| new_session(seed_prompt))
    }

    /// Mark the session paused. A running cycle is paused through its handle.
    pub fn pause(&mut self) -> bool {
        match self.session.as_mut() {
            Some(session) => {
                session.set_status(SessionStatus::Paused);
                info!("Session {} paused", session.id);
                true
            }
            None => false,
        }
    }

    /// Discard the current session
    pub fn reset(&mut self) {
        if let Some(session) = self.session.take() {
            info!("Session {} reset", session.id);
            self.state.sessions.retain(|s| s.id != session.id);
            if self.state.current_session_id.as_deref() == Some(session.id.as_str()) {
                self.state.current_session_id = None;
            }
        }
    }

    pub fn update_prompt(&mut self, prompt: impl Into<String>) -> bool {
        match self.session.as_mut() {
            Some(session) => {
                session.set_seed_prompt(prompt);
                true
            }
            None => false,
        }
    }

    pub fn update_agent(&mut self, agent_id: &str, update: AgentUpdate) -> bool {
        self.session
            .as_mut()
            .map(|session| session.update_agent(agent_id, update))
            .unwrap_or(false)
    }

    /// Bind each agent to the first usable model assigned to its team.
    ///
    /// Returns the number of agents rebound.
    pub fn apply_team_assignments(&mut self) -> usize {
        let Some(session) = self.session.as_mut() else {
            return 0;
        };

        let mut bound = 0;
        let agent_ids: Vec<(String, AgentRole)> =
            session.agents.iter().map(|a| (a.id.clone(), a.role())).collect();

        for (agent_id, role) in agent_ids {
            let model = self.state.models.iter().find(|m| {
                m.assigned_team.is_some_and(|team| team.matches(role)) && self.state.is_model_usable(m)
            });
            let Some(model) = model else {
                continue;
            };

            session.update_agent(
                &agent_id,
                AgentUpdate {
                    provider_id: Some(Some(model.provider_id.clone())),
                    model_id: Some(Some(model.id.clone())),
                    ..Default::default()
                },
            );
            info!("Agent {} assigned model {}", agent_id, model.label);
            bound += 1;
        }
        bound
    }

    /// Manual turn for a single agent of the current session
    pub async fn execute_agent(&mut self, agent_id: &str) -> Result<Message, TurnError> {
        let session = self
            .session
            .as_mut()
            .ok_or(TurnError::NoActiveSession)?;
        self.engine.execute_agent(session, &self.state, agent_id).await
    }

    /// Fold the session into the state and persist it.
    ///
    /// Failures are logged by the store; the return value reports success.
    pub fn save(&mut self, store: &StateStore) -> bool {
        if let Some(session) = &self.session {
            self.state.save_session(session.clone());
        }
        store.save(&self.state)
    }

    /// Consume the driver, returning the state with the session folded in
    pub fn into_state(mut self) -> AppState {
        if let Some(session) = self.session.take() {
            self.state.save_session(session);
        }
        self.state
    }
}

fn new_session(seed_prompt: &str) -> Session {
    let session = Session::new(seed_prompt, default_agents());
    info!("Created session {}", session.id);
    session
}
