//! The arena: turn engine, generation and scoring

pub mod control;
pub mod driver;
pub mod engine;
pub mod error;
pub mod generator;
pub mod llm;
pub mod mock;
pub mod scoring;

#[cfg(test)]
mod scoring_test;

pub use control::{channel, TurnCommand, TurnControl, TurnHandle, TurnState};
pub use driver::Arena;
pub use engine::{EngineSettings, RunSummary, TurnEngine, TurnEvent, TurnOutcome};
pub use error::{CallError, TurnError};
pub use generator::GenerationSettings;
pub use llm::{ModelCallAdapter, ModelCallPort, ModelCallResult};
pub use scoring::{calculate_average_score, calculate_heuristic_score};
