//! # Gaunt - Multi-agent creative exploration arena
//!
//! Three fixed agents take turns on a seed prompt: Red generates bold ideas,
//! Blue stress-tests them, Purple integrates both into a plan. Each message is
//! produced by a configured AI provider when one is bound and unlocked, or by
//! a persona template otherwise, then scored on five heuristic axes.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gaunt::arena::{Arena, EngineSettings, TurnControl, TurnEngine};
//! use gaunt::domain::AppState;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let engine = TurnEngine::mock_only(EngineSettings::default());
//!     let mut arena = Arena::new(engine, AppState::default(), "Reinvent the city bus");
//!
//!     arena
//!         .start(&mut TurnControl::detached(), Some(1), |event| println!("{:?}", event))
//!         .await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **Domain**: agents, sessions, messages, provider configuration
//! - **Arena**: scoring, mock personas, model calls, the turn engine
//! - **Adapters**: encryption, secrets, snapshot storage, export, REST handlers
//! - **Persistence**: SQLite table behind the REST handlers
//! - **Config**: settings and validation

pub mod adapters;
pub mod arena;
pub mod cli;
pub mod config;
pub mod domain;
pub mod persistence;

use crate::adapters::api_handler::{self, ApiState};
use crate::adapters::health_handler::HealthHandler;
use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Creates the Axum application router.
///
/// # Arguments
///
/// * `health_handler` - Health check handler
/// * `api_state` - Provider-config repository and server secret
///
/// # Returns
///
/// Router serving `/health` and the REST API under `/api`
pub fn create_app(health_handler: Arc<HealthHandler>, api_state: ApiState) -> Router {
    let api_router = Router::new()
        .route(
            "/providers",
            get(api_handler::list_providers).post(api_handler::create_provider),
        )
        .route(
            "/providers/:id",
            put(api_handler::update_provider).delete(api_handler::delete_provider),
        )
        .route("/arena/respond", post(api_handler::respond_arena))
        .with_state(api_state);

    Router::new()
        .route(
            "/health",
            get({
                let handler = health_handler.clone();
                move || {
                    let h = handler.clone();
                    async move { h.health().await }
                }
            }),
        )
        .nest("/api", api_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
