//! Cooperative turn control
//!
//! A [`TurnHandle`] sends commands; the engine owns the matching
//! [`TurnControl`] and folds pending commands into its [`TurnState`] at every
//! suspension point. Commands never interrupt an in-flight model call.

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::debug;

use crate::domain::AgentRole;

/// Command accepted by a running turn cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnCommand {
    Pause,
    Resume,
    Stop,
    /// Skip the next scheduled role
    SkipNext,
}

/// Transient execution cursor of a turn cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnState {
    pub is_running: bool,
    pub is_paused: bool,
    pub should_stop: bool,
    pub skip_next: bool,
    pub current_agent_index: usize,
    pub role_order: [AgentRole; 3],
}

impl Default for TurnState {
    fn default() -> Self {
        Self {
            is_running: false,
            is_paused: false,
            should_stop: false,
            skip_next: false,
            current_agent_index: 0,
            role_order: AgentRole::TURN_ORDER,
        }
    }
}

impl TurnState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the cursor for a new cycle. A pending pause or skip carries over.
    pub fn begin_cycle(&mut self) {
        *self = TurnState {
            is_running: true,
            is_paused: self.is_paused,
            skip_next: self.skip_next,
            ..TurnState::default()
        };
    }

    pub fn finish_cycle(&mut self) {
        self.is_running = false;
    }

    pub fn apply(&mut self, command: TurnCommand) {
        debug!("Turn command: {:?}", command);
        match command {
            TurnCommand::Pause => self.is_paused = true,
            TurnCommand::Resume => self.is_paused = false,
            TurnCommand::Stop => {
                self.should_stop = true;
                self.is_paused = false;
            }
            TurnCommand::SkipNext => self.skip_next = true,
        }
    }
}

/// Create a connected handle/control pair
pub fn channel() -> (TurnHandle, TurnControl) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        TurnHandle { tx },
        TurnControl {
            rx,
            disconnected: false,
        },
    )
}

/// Sending side of turn control; cheap to clone
#[derive(Debug, Clone)]
pub struct TurnHandle {
    tx: mpsc::UnboundedSender<TurnCommand>,
}

impl TurnHandle {
    /// Send a command. Returns false when the engine side is gone.
    pub fn send(&self, command: TurnCommand) -> bool {
        self.tx.send(command).is_ok()
    }

    pub fn pause(&self) -> bool {
        self.send(TurnCommand::Pause)
    }

    pub fn resume(&self) -> bool {
        self.send(TurnCommand::Resume)
    }

    pub fn stop(&self) -> bool {
        self.send(TurnCommand::Stop)
    }

    pub fn skip_next(&self) -> bool {
        self.send(TurnCommand::SkipNext)
    }
}

/// Receiving side of turn control, owned by the engine
#[derive(Debug)]
pub struct TurnControl {
    rx: mpsc::UnboundedReceiver<TurnCommand>,
    disconnected: bool,
}

impl TurnControl {
    /// Control with no handle attached; it never pauses, stops or skips
    pub fn detached() -> Self {
        channel().1
    }

    /// Apply every command queued so far
    pub fn drain(&mut self, state: &mut TurnState) {
        loop {
            match self.rx.try_recv() {
                Ok(command) => state.apply(command),
                Err(mpsc::error::TryRecvError::Empty) => break,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    self.disconnected = true;
                    break;
                }
            }
        }
        self.stop_if_orphaned(state);
    }

    /// Block while paused, until resumed or stopped
    pub async fn wait_while_paused(&mut self, state: &mut TurnState) {
        while state.is_paused && !state.should_stop {
            match self.rx.recv().await {
                Some(command) => state.apply(command),
                None => {
                    self.disconnected = true;
                    self.stop_if_orphaned(state);
                }
            }
        }
    }

    /// Drain pending commands, then wait out a pause
    pub async fn checkpoint(&mut self, state: &mut TurnState) {
        self.drain(state);
        self.wait_while_paused(state).await;
    }

    /// Sleep for `duration`, returning early on stop
    pub async fn delay(&mut self, state: &mut TurnState, duration: Duration) {
        let sleep = tokio::time::sleep(duration);
        tokio::pin!(sleep);

        while !self.disconnected {
            tokio::select! {
                _ = &mut sleep => return,
                command = self.rx.recv() => match command {
                    Some(command) => {
                        state.apply(command);
                        if state.should_stop {
                            return;
                        }
                    }
                    None => self.disconnected = true,
                },
            }
        }

        self.stop_if_orphaned(state);
        if !state.should_stop {
            sleep.await;
        }
    }

    /// Nobody can resume a pause once every handle is dropped
    fn stop_if_orphaned(&self, state: &mut TurnState) {
        if self.disconnected && state.is_paused {
            state.apply(TurnCommand::Stop);
        }
    }
}
