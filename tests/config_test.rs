use gaunt::config::Settings;
use gaunt::domain::{AppState, ProviderType, DEFAULT_SEED_PROMPT};
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_defaults_without_config_file() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let settings = Settings::from_root(temp_dir.path())?;

    assert_eq!(settings.server.host, "127.0.0.1");
    assert_eq!(settings.server.port, 4000);
    assert!(settings.server.secret_key.is_none());
    assert_eq!(settings.arena.seed_prompt, DEFAULT_SEED_PROMPT);
    assert_eq!(settings.storage.key, "gauntletfuse_state");
    assert!(settings.providers.is_empty());

    let engine = settings.arena.engine_settings();
    assert_eq!(engine.inter_turn_delay, Duration::from_millis(2000));
    assert_eq!(engine.generation.max_tokens, 1000);
    Ok(())
}

#[test]
fn test_load_file_and_external_providers() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();
    fs::create_dir_all(root.join("config/providers"))?;

    let gaunt_toml = r#"
[server]
host = "0.0.0.0"
port = 8080
secret_key = "server-secret"

[arena]
seed_prompt = "Reimagine public libraries"
inter_turn_delay_ms = 500
default_temperature = 0.4

[storage]
dir = "state"
"#;
    fs::write(root.join("gaunt.toml"), gaunt_toml)?;

    let local_json = r#"
{
    "id": "local",
    "name": "Local LLM",
    "slug": "local",
    "type": "direct",
    "baseUrl": "http://localhost:11434/v1",
    "models": ["llama3"],
    "apiKeyAlias": "LOCAL_API_KEY"
}
"#;
    fs::write(root.join("config/providers/local.json"), local_json)?;

    let openai_yaml = r#"
id: openai
name: OpenAI (proxy)
slug: openai
type: openrouter
baseUrl: https://proxy.example.com/v1
apiKeyAlias: OPENAI_API_KEY
"#;
    fs::write(root.join("config/providers/openai.yaml"), openai_yaml)?;
    fs::write(root.join("config/providers/README.md"), "ignored")?;

    let settings = Settings::from_root(root)?;

    assert_eq!(settings.server.host, "0.0.0.0");
    assert_eq!(settings.server.port, 8080);
    assert_eq!(settings.server.secret_key.as_deref(), Some("server-secret"));
    assert_eq!(settings.arena.seed_prompt, "Reimagine public libraries");
    assert_eq!(settings.arena.max_tokens, 1000);
    assert_eq!(settings.arena.engine_settings().inter_turn_delay, Duration::from_millis(500));
    assert_eq!(settings.storage.dir, std::path::PathBuf::from("state"));
    assert_eq!(settings.providers.len(), 2);

    // Configured providers extend the catalog and replace same-id entries
    let mut state = AppState::default();
    let catalog_size = state.providers.len();
    settings.apply_providers(&mut state);
    assert_eq!(state.providers.len(), catalog_size + 1);
    let openai = state.provider("openai").unwrap();
    assert_eq!(openai.provider_type, ProviderType::OpenRouter);
    assert_eq!(openai.base_url.as_deref(), Some("https://proxy.example.com/v1"));
    assert!(state.provider("local").is_some());
    Ok(())
}

#[test]
fn test_invalid_config_reports_every_error() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();

    let gaunt_toml = r#"
[server]
host = ""
port = 0

[arena]
max_tokens = 0

[database]
url = "postgres://localhost/gaunt"
"#;
    fs::write(root.join("gaunt.toml"), gaunt_toml)?;

    let err = Settings::from_root(root).unwrap_err().to_string();
    assert!(err.contains("Configuration validation failed"));
    assert!(err.contains("server.host"));
    assert!(err.contains("server.port"));
    assert!(err.contains("arena.max_tokens"));
    assert!(err.contains("database.url"));
    Ok(())
}
