use anyhow::{anyhow, bail, Context};
use clap::Parser;
use gaunt::adapters::admin::{self, NewModel};
use gaunt::adapters::api_handler::{ApiState, DEFAULT_SERVER_SECRET};
use gaunt::adapters::export::{export_app_state, export_session};
use gaunt::adapters::health_handler::HealthHandler;
use gaunt::adapters::secrets::{create_passphrase_store, validate_passphrase, SecretVault};
use gaunt::adapters::{encryption, storage::StateStore};
use gaunt::arena::{channel, Arena, ModelCallAdapter, TurnEngine, TurnEvent};
use gaunt::cli::{Cli, Command, ModelAction, ProviderAction, SecretAction};
use gaunt::config::Settings;
use gaunt::domain::{AgentUpdate, AppState, AssignedTeam, Message};
use gaunt::persistence::{DataStore, ProviderRepository};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let settings = Settings::new_with_cli(&cli)?;

    match cli.command.clone() {
        Command::Run {
            cycles,
            continuous,
            prompt,
            assign_teams,
        } => {
            let store = settings.storage.state_store();
            let mut arena = open_arena(&settings, &cli, &store, prompt.clone());
            if let Some(prompt) = prompt {
                arena.update_prompt(prompt);
            }
            if assign_teams {
                arena.open_session();
                let bound = arena.apply_team_assignments();
                info!("Bound {} agents to team models", bound);
            }

            let (handle, mut control) = channel();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("Interrupt received, stopping after the current agent");
                    handle.stop();
                }
            });

            let max_cycles = if continuous { None } else { Some(cycles) };
            let summary = arena.start(&mut control, max_cycles, print_event).await?;
            info!(
                "Ran {} cycles, {} messages{}",
                summary.cycles,
                summary.generated,
                if summary.stopped { " (stopped)" } else { "" }
            );

            save(&mut arena, &store)?;
        }

        Command::Agent {
            agent_id,
            model,
            temperature,
        } => {
            let store = settings.storage.state_store();
            let mut arena = open_arena(&settings, &cli, &store, None);
            arena.open_session();

            let mut update = AgentUpdate::default();
            if let Some(model_id) = model {
                let model = arena
                    .state()
                    .model(&model_id)
                    .ok_or_else(|| anyhow!("Unknown model config: {}", model_id))?;
                update.provider_id = Some(Some(model.provider_id.clone()));
                update.model_id = Some(Some(model.id.clone()));
            }
            if let Some(temperature) = temperature {
                update.temperature = Some(Some(temperature));
            }
            if !arena.update_agent(&agent_id, update) {
                bail!("Unknown agent: {}", agent_id);
            }

            let message = arena.execute_agent(&agent_id).await?;
            print_message(&message);
            save(&mut arena, &store)?;
        }

        Command::Reset => {
            let store = settings.storage.state_store();
            let mut arena = open_arena(&settings, &cli, &store, None);
            arena.reset();
            save(&mut arena, &store)?;
            info!("Session discarded");
        }

        Command::Serve => serve(&settings).await?,

        Command::EncryptSecret { value } => {
            let passphrase = require_passphrase(&cli)?;
            validate_passphrase(passphrase)?;
            println!("{}", encryption::encrypt(&value, passphrase)?);
        }

        Command::Secret { action } => {
            let store = settings.storage.state_store();
            let mut state = load_state(&settings, &store);
            match action {
                SecretAction::Set { alias, value } => {
                    let passphrase = require_passphrase(&cli)?;
                    SecretVault::new(&mut state.secrets).set(&alias, &value, passphrase)?;
                }
                SecretAction::List => {
                    for entry in admin::list_secrets(&mut state) {
                        println!(
                            "{}\t{}{}",
                            entry.alias,
                            entry.providers.join(","),
                            if entry.sealed { "" } else { "\t(not encrypted)" }
                        );
                    }
                    return Ok(());
                }
                SecretAction::Remove { alias } => admin::remove_secret(&mut state, &alias)?,
            }
            save_state(&store, &state)?;
        }

        Command::Model { action } => {
            let store = settings.storage.state_store();
            let mut state = load_state(&settings, &store);
            match action {
                ModelAction::Add {
                    provider_id,
                    model,
                    label,
                    team,
                    temperature,
                    base_url,
                } => {
                    let config = admin::add_model(
                        &mut state,
                        NewModel {
                            provider_id,
                            model,
                            label,
                            team,
                            temperature,
                            base_url_override: base_url,
                        },
                    )?;
                    println!("{}", config.id);
                }
                ModelAction::List => {
                    for model in &state.models {
                        println!(
                            "{}\t{}\t{}\t{}{}",
                            model.id,
                            model.provider_id,
                            model.model,
                            model.label,
                            match model.assigned_team {
                                Some(team) if team != AssignedTeam::None => format!("\t{:?}", team),
                                _ => String::new(),
                            }
                        );
                    }
                    return Ok(());
                }
                ModelAction::Assign { id, team } => admin::assign_team(&mut state, &id, team)?,
                ModelAction::Remove { id } => admin::remove_model(&mut state, &id)?,
            }
            save_state(&store, &state)?;
        }

        Command::Provider { action } => {
            let store = settings.storage.state_store();
            let mut state = load_state(&settings, &store);
            match action {
                ProviderAction::List => {
                    for entry in admin::list_providers(&mut state) {
                        println!(
                            "{}\t{}\t{}\t{}",
                            entry.id,
                            entry.name,
                            if entry.has_key { "key stored" } else { "no key" },
                            entry.models.join(",")
                        );
                    }
                    return Ok(());
                }
                ProviderAction::DiscoverModels { provider_id } => {
                    let models = admin::discover_models(&mut state, &provider_id)?;
                    println!("{}", models.join("\n"));
                }
                ProviderAction::Remove { id } => admin::remove_provider(&mut state, &id)?,
            }
            save_state(&store, &state)?;
        }

        Command::Export {
            format,
            state: whole_state,
            output,
        } => {
            let store = settings.storage.state_store();
            let state = load_state(&settings, &store);

            let exported = if whole_state {
                export_app_state(&state, require_passphrase(&cli)?)?
            } else {
                let session = state
                    .current_session()
                    .ok_or_else(|| anyhow!("No session to export"))?;
                export_session(session, format)?
            };

            match output {
                Some(path) => {
                    std::fs::write(&path, exported)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    info!("Exported to {}", path.display());
                }
                None => println!("{}", exported),
            }
        }
    }

    Ok(())
}

fn load_state(settings: &Settings, store: &StateStore) -> AppState {
    let mut state = store.load().unwrap_or_default();
    settings.apply_providers(&mut state);
    state
}

fn open_arena(settings: &Settings, cli: &Cli, store: &StateStore, prompt: Option<String>) -> Arena {
    let state = load_state(settings, store);
    let passphrases = create_passphrase_store(cli.secret_passphrase.clone());
    if cli.secret_passphrase.is_none() {
        info!("No secret passphrase given, agents will use mock responses");
    }

    let engine = TurnEngine::new(
        Arc::new(ModelCallAdapter::new(passphrases)),
        settings.arena.engine_settings(),
    );
    let seed_prompt = prompt.unwrap_or_else(|| settings.arena.seed_prompt.clone());
    Arena::new(engine, state, seed_prompt)
}

fn save_state(store: &StateStore, state: &AppState) -> anyhow::Result<()> {
    if !store.save(state) {
        bail!("Failed to save state to {}", store.path().display());
    }
    Ok(())
}

fn save(arena: &mut Arena, store: &StateStore) -> anyhow::Result<()> {
    if !arena.save(store) {
        bail!("Failed to save state to {}", store.path().display());
    }
    Ok(())
}

fn require_passphrase(cli: &Cli) -> anyhow::Result<&str> {
    cli.secret_passphrase
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| anyhow!("--secret-passphrase (or GAUNT_SECRET_PASSPHRASE) is required"))
}

fn print_event(event: &TurnEvent) {
    match event {
        TurnEvent::CycleStarted { turn } => println!("=== Turn {} ===\n", turn + 1),
        TurnEvent::MessageGenerated { message } => print_message(message),
        TurnEvent::RoleSkipped { role } => println!("({} skipped)\n", role.label()),
        TurnEvent::CycleFinished { .. } => {}
    }
}

fn print_message(message: &Message) {
    println!("[{}] {}", message.role.label(), message.content);
    if let Some(score) = &message.score {
        println!(
            "  novelty {:.0} | feasibility {:.0} | value {:.0} | safety {:.0} | exploration {:.1}",
            score.novelty, score.feasibility, score.value_impact, score.safety, score.exploration_index
        );
    }
    println!();
}

async fn serve(settings: &Settings) -> anyhow::Result<()> {
    let store = DataStore::new(&settings.database).await?;

    let secret_key = match &settings.server.secret_key {
        Some(key) => key.clone(),
        None => {
            warn!("server.secret_key is not set, API keys are sealed with the built-in default");
            DEFAULT_SERVER_SECRET.to_string()
        }
    };

    let providers: Arc<dyn ProviderRepository> = store.providers().clone();
    let api_state = ApiState::new(providers, secret_key);
    let health_handler = Arc::new(HealthHandler::new(Some(store.clone())));
    let app = gaunt::create_app(health_handler, api_state);

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port).parse()?;
    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    store.close().await;
    Ok(())
}
