//! Turn engine
//!
//! Runs the Red, Blue, Purple cycle over a session. Each generated message is
//! appended and announced before the next role starts, so later roles see
//! everything said earlier in the same cycle.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::control::{TurnControl, TurnState};
use super::error::TurnError;
use super::generator::{generate_message, GenerationSettings};
use super::llm::ModelCallPort;
use crate::domain::{AgentRole, AppState, Message, Session, SessionStatus};

/// Default pause between automatically chained cycles
pub const DEFAULT_INTER_TURN_DELAY: Duration = Duration::from_millis(2000);

/// Notification emitted while a cycle runs
#[derive(Debug, Clone, PartialEq)]
pub enum TurnEvent {
    CycleStarted { turn: u32 },
    /// A message was scored and appended to the session
    MessageGenerated { message: Message },
    RoleSkipped { role: AgentRole },
    CycleFinished { turn: u32, generated: usize, stopped: bool },
}

/// What a single cycle produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnOutcome {
    pub generated: usize,
    /// The cycle ended early on a stop command
    pub stopped: bool,
}

/// What an automatic run produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: u32,
    pub generated: usize,
    pub stopped: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineSettings {
    pub generation: GenerationSettings,
    pub inter_turn_delay: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            generation: GenerationSettings::default(),
            inter_turn_delay: DEFAULT_INTER_TURN_DELAY,
        }
    }
}

/// Puts a session back to `Idle` when its run is dropped mid-cycle
struct RunGuard<'a> {
    session: &'a mut Session,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if matches!(self.session.status, SessionStatus::Running | SessionStatus::Paused) {
            warn!("Run of session {} was interrupted", self.session.id);
            self.session.set_status(SessionStatus::Idle);
        }
    }
}

/// Sequences agent turns over a session
pub struct TurnEngine {
    port: Option<Arc<dyn ModelCallPort>>,
    settings: EngineSettings,
}

impl TurnEngine {
    /// Engine that calls live models through `port`
    pub fn new(port: Arc<dyn ModelCallPort>, settings: EngineSettings) -> Self {
        Self {
            port: Some(port),
            settings,
        }
    }

    /// Engine that only produces mock responses
    pub fn mock_only(settings: EngineSettings) -> Self {
        Self { port: None, settings }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Run one Red, Blue, Purple cycle.
    ///
    /// Fails with [`TurnError::MissingParticipants`] before touching the
    /// session or `state` when a scheduled role has no agent. The caller
    /// counts the cycle in `current_turn`.
    pub async fn execute_turn<F>(
        &self,
        session: &mut Session,
        host: &AppState,
        state: &mut TurnState,
        control: &mut TurnControl,
        mut observer: F,
    ) -> Result<TurnOutcome, TurnError>
    where
        F: FnMut(&TurnEvent) + Send,
    {
        if !session.can_execute_turn() {
            return Err(TurnError::MissingParticipants);
        }

        state.begin_cycle();
        let turn = session.current_turn;
        info!("Starting turn {} of session {}", turn, session.id);
        observer(&TurnEvent::CycleStarted { turn });

        let mut generated = 0;
        let mut stopped = false;
        let role_order = state.role_order;

        for (index, role) in role_order.into_iter().enumerate() {
            state.current_agent_index = index;
            self.checkpoint(session, state, control).await;

            if state.should_stop {
                info!("Turn {} stopped before {}", turn, role);
                stopped = true;
                break;
            }

            if state.skip_next {
                state.skip_next = false;
                debug!("Skipping {} in turn {}", role, turn);
                observer(&TurnEvent::RoleSkipped { role });
                continue;
            }

            let Some(agent) = session.agent_for_role(role).cloned() else {
                continue;
            };

            let message = generate_message(
                self.port.as_deref(),
                host,
                &self.settings.generation,
                &agent,
                &session.seed_prompt,
                session.messages(),
            )
            .await;

            session.push_message(message.clone());
            generated += 1;
            observer(&TurnEvent::MessageGenerated { message });
        }

        state.current_agent_index = role_order.len();
        state.finish_cycle();
        info!("Finished turn {} with {} messages", turn, generated);
        observer(&TurnEvent::CycleFinished {
            turn,
            generated,
            stopped,
        });

        Ok(TurnOutcome { generated, stopped })
    }

    /// Generate one message for a chosen agent, outside any cycle
    pub async fn execute_agent(
        &self,
        session: &mut Session,
        host: &AppState,
        agent_id: &str,
    ) -> Result<Message, TurnError> {
        let agent = session
            .agent(agent_id)
            .cloned()
            .ok_or_else(|| TurnError::AgentNotFound(agent_id.to_string()))?;

        info!("Manual turn for agent {}", agent.id);
        let message = generate_message(
            self.port.as_deref(),
            host,
            &self.settings.generation,
            &agent,
            &session.seed_prompt,
            session.messages(),
        )
        .await;

        session.push_message(message.clone());
        Ok(message)
    }

    /// Chain cycles until stopped or `max_cycles` is reached.
    ///
    /// Participants are re-checked before every cycle. The session ends
    /// `Completed` when the maximum is reached and `Idle` when stopped.
    pub async fn run_cycles<F>(
        &self,
        session: &mut Session,
        host: &AppState,
        control: &mut TurnControl,
        max_cycles: Option<u32>,
        mut observer: F,
    ) -> Result<RunSummary, TurnError>
    where
        F: FnMut(&TurnEvent) + Send,
    {
        if !session.can_execute_turn() {
            return Err(TurnError::MissingParticipants);
        }

        let mut state = TurnState::new();
        let mut summary = RunSummary {
            cycles: 0,
            generated: 0,
            stopped: false,
        };
        session.set_status(SessionStatus::Running);
        let mut guard = RunGuard { session };
        let session = &mut *guard.session;

        loop {
            self.checkpoint(session, &mut state, control).await;
            if state.should_stop {
                summary.stopped = true;
                break;
            }

            let outcome = match self
                .execute_turn(session, host, &mut state, control, &mut observer)
                .await
            {
                Ok(outcome) => outcome,
                Err(e) => {
                    session.set_status(SessionStatus::Idle);
                    return Err(e);
                }
            };

            session.complete_cycle();
            summary.cycles += 1;
            summary.generated += outcome.generated;

            if outcome.stopped {
                summary.stopped = true;
                break;
            }

            if max_cycles.is_some_and(|max| summary.cycles >= max) {
                info!("Session {} completed after {} turns", session.id, summary.cycles);
                session.set_status(SessionStatus::Completed);
                return Ok(summary);
            }

            self.checkpoint(session, &mut state, control).await;
            if !state.should_stop {
                control.delay(&mut state, self.settings.inter_turn_delay).await;
            }
            if state.should_stop {
                summary.stopped = true;
                break;
            }
        }

        info!("Session {} stopped after {} turns", session.id, summary.cycles);
        session.set_status(SessionStatus::Idle);
        Ok(summary)
    }

    /// Apply queued commands; while paused the session reports `Paused`
    async fn checkpoint(&self, session: &mut Session, state: &mut TurnState, control: &mut TurnControl) {
        control.drain(state);
        if !state.is_paused {
            return;
        }

        let previous = session.status;
        session.set_status(SessionStatus::Paused);
        info!("Session {} paused", session.id);
        control.wait_while_paused(state).await;
        session.set_status(previous);
        if !state.should_stop {
            info!("Session {} resumed", session.id);
        }
    }
}
