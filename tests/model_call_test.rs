use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use gaunt::adapters::encryption;
use gaunt::adapters::secrets::create_passphrase_store;
use gaunt::arena::llm::{ChatMessage, CompletionRequest, ModelCall};
use gaunt::arena::{
    EngineSettings, ModelCallAdapter, ModelCallPort, TurnControl, TurnEngine, TurnState,
};
use gaunt::domain::{
    Agent, AgentRole, AppState, ModelConfig, Provider, ProviderType, Secret, Session,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const PASSPHRASE: &str = "correct horse battery";
const API_KEY: &str = "sk-fake-123";

#[derive(Debug, Clone)]
struct Captured {
    path: String,
    headers: HeaderMap,
    body: Value,
}

type Log = Arc<Mutex<Vec<Captured>>>;

async fn record(log: &Log, path: &str, headers: HeaderMap, body: Value) {
    log.lock().unwrap().push(Captured {
        path: path.to_string(),
        headers,
        body,
    });
}

/// Local stand-in for provider APIs; returns its base address and request log
async fn spawn_fake_provider() -> (String, Log) {
    let log: Log = Arc::default();

    let app = Router::new()
        .route(
            "/v1/chat/completions",
            post(|State(log): State<Log>, headers: HeaderMap, Json(body): Json<Value>| async move {
                record(&log, "/v1/chat/completions", headers, body).await;
                Json(json!({
                    "choices": [{"message": {"role": "assistant", "content": "Live OpenAI reply"}}],
                    "usage": {"prompt_tokens": 12, "completion_tokens": 8, "total_tokens": 20}
                }))
            }),
        )
        .route(
            "/v1/messages",
            post(|State(log): State<Log>, headers: HeaderMap, Json(body): Json<Value>| async move {
                record(&log, "/v1/messages", headers, body).await;
                Json(json!({
                    "content": [{"type": "text", "text": "Live Anthropic reply"}],
                    "usage": {"input_tokens": 10, "output_tokens": 5}
                }))
            }),
        )
        .route(
            "/broken/chat/completions",
            post(|State(log): State<Log>, headers: HeaderMap, Json(body): Json<Value>| async move {
                record(&log, "/broken/chat/completions", headers, body).await;
                (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response()
            }),
        )
        .route(
            "/huge/messages",
            post(|State(log): State<Log>, headers: HeaderMap, Json(body): Json<Value>| async move {
                record(&log, "/huge/messages", headers, body).await;
                Json(json!({
                    "content": [{"type": "text", "text": "Counted"}],
                    "usage": {"input_tokens": u32::MAX, "output_tokens": 1}
                }))
            }),
        )
        .route(
            "/huge/chat/completions",
            post(|State(log): State<Log>, headers: HeaderMap, Json(body): Json<Value>| async move {
                record(&log, "/huge/chat/completions", headers, body).await;
                Json(json!({
                    "choices": [{"message": {"role": "assistant", "content": "Counted"}}],
                    "usage": {"prompt_tokens": u32::MAX, "completion_tokens": 7}
                }))
            }),
        )
        .with_state(log.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), log)
}

fn provider(id: &str, slug: &str, base_url: String) -> Provider {
    Provider {
        id: id.to_string(),
        name: format!("Fake {}", slug),
        slug: slug.to_string(),
        provider_type: ProviderType::Direct,
        base_url: Some(base_url),
        models: vec![],
        api_key_alias: format!("{}_KEY", id.to_uppercase()),
        get_key_url: String::new(),
        notes: None,
    }
}

fn secret_for(provider: &Provider) -> Secret {
    Secret {
        alias: provider.api_key_alias.clone(),
        value_encrypted: encryption::encrypt(API_KEY, PASSPHRASE).unwrap(),
    }
}

fn adapter() -> ModelCallAdapter {
    ModelCallAdapter::new(create_passphrase_store(Some(PASSPHRASE.to_string())))
}

fn request() -> CompletionRequest {
    CompletionRequest {
        messages: vec![
            ChatMessage::system("You are the Red agent."),
            ChatMessage::user("Propose something bold."),
        ],
        temperature: 0.9,
        max_tokens: 256,
    }
}

#[tokio::test]
async fn test_openai_compatible_shape() {
    let (base, log) = spawn_fake_provider().await;
    let p = provider("fake", "openai", format!("{}/v1/", base));
    let secret = secret_for(&p);

    let result = adapter()
        .call_model(ModelCall {
            provider: &p,
            model: "gpt-4",
            base_url_override: None,
            secret: Some(&secret),
            request: request(),
            timeout: Duration::from_secs(5),
        })
        .await;

    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.content.as_deref(), Some("Live OpenAI reply"));
    let usage = result.usage.unwrap();
    assert_eq!((usage.prompt_tokens, usage.completion_tokens, usage.total_tokens), (12, 8, 20));

    let captured = log.lock().unwrap()[0].clone();
    assert_eq!(captured.path, "/v1/chat/completions");
    assert_eq!(captured.headers["authorization"], format!("Bearer {}", API_KEY).as_str());
    assert_eq!(captured.body["model"], "gpt-4");
    assert_eq!(captured.body["max_tokens"], 256);
    assert_eq!(captured.body["messages"][0]["role"], "system");
    assert_eq!(captured.body["messages"][1]["content"], "Propose something bold.");
    assert!((captured.body["temperature"].as_f64().unwrap() - 0.9).abs() < 1e-6);
}

#[tokio::test]
async fn test_anthropic_shape() {
    let (base, log) = spawn_fake_provider().await;
    let p = provider("claude", "anthropic", format!("{}/v1", base));
    let secret = secret_for(&p);

    let result = adapter()
        .call_model(ModelCall {
            provider: &p,
            model: "claude-3-opus",
            base_url_override: None,
            secret: Some(&secret),
            request: request(),
            timeout: Duration::from_secs(5),
        })
        .await;

    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.content.as_deref(), Some("Live Anthropic reply"));
    assert_eq!(result.usage.unwrap().total_tokens, 15);

    let captured = log.lock().unwrap()[0].clone();
    assert_eq!(captured.path, "/v1/messages");
    assert_eq!(captured.headers["x-api-key"], API_KEY);
    assert_eq!(captured.headers["anthropic-version"], "2023-06-01");
    assert_eq!(captured.body["system"], "You are the Red agent.");
    assert_eq!(captured.body["messages"], json!([{"role": "user", "content": "Propose something bold."}]));
    assert_eq!(captured.body["max_tokens"], 256);
}

#[tokio::test]
async fn test_http_error_is_reported() {
    let (base, _log) = spawn_fake_provider().await;
    let p = provider("fake", "openai", format!("{}/broken", base));
    let secret = secret_for(&p);

    let result = adapter()
        .call_model(ModelCall {
            provider: &p,
            model: "gpt-4",
            base_url_override: None,
            secret: Some(&secret),
            request: request(),
            timeout: Duration::from_secs(5),
        })
        .await;

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("API error: 500 - upstream exploded"));
}

#[tokio::test]
async fn test_oversized_usage_saturates() {
    let (base, _log) = spawn_fake_provider().await;

    for slug in ["anthropic", "openai"] {
        let p = provider("huge", slug, format!("{}/huge", base));
        let secret = secret_for(&p);
        let result = adapter()
            .call_model(ModelCall {
                provider: &p,
                model: "any-model",
                base_url_override: None,
                secret: Some(&secret),
                request: request(),
                timeout: Duration::from_secs(5),
            })
            .await;

        assert!(result.success, "{}: {:?}", slug, result.error);
        assert_eq!(result.content.as_deref(), Some("Counted"));
        assert_eq!(result.usage.unwrap().total_tokens, u32::MAX);
    }
}

#[tokio::test]
async fn test_wrong_passphrase_never_reaches_network() {
    let (base, log) = spawn_fake_provider().await;
    let p = provider("fake", "openai", format!("{}/v1", base));
    let secret = secret_for(&p);

    let locked = ModelCallAdapter::new(create_passphrase_store(Some("wrong passphrase".to_string())));
    let result = locked
        .call_model(ModelCall {
            provider: &p,
            model: "gpt-4",
            base_url_override: None,
            secret: Some(&secret),
            request: request(),
            timeout: Duration::from_secs(5),
        })
        .await;

    assert_eq!(result.error.as_deref(), Some("API key not found or could not be decrypted"));
    assert!(log.lock().unwrap().is_empty());
}

fn host_with(providers: Vec<Provider>) -> AppState {
    let mut state = AppState::default();
    for p in providers {
        state.secrets.push(secret_for(&p));
        state.upsert_provider(p);
    }
    state
}

#[tokio::test]
async fn test_engine_uses_live_provider_per_agent() {
    let (base, log) = spawn_fake_provider().await;
    let mut host = host_with(vec![
        provider("fake", "openai", format!("{}/v1", base)),
        provider("claude", "anthropic", format!("{}/v1", base)),
    ]);
    host.upsert_model(ModelConfig {
        id: "claude-default".to_string(),
        provider_id: "claude".to_string(),
        model: "claude-3-opus".to_string(),
        label: "Claude 3 Opus".to_string(),
        temperature: None,
        top_p: None,
        max_tokens: None,
        base_url_override: None,
        assigned_team: None,
    });

    let mut session = Session::new(
        "Quieter streets",
        vec![
            Agent::new("agent-red", "Red Agent", AgentRole::Red).with_model("fake", "gpt-4"),
            Agent::new("agent-blue", "Blue Agent", AgentRole::Blue).with_model("claude", "claude-default"),
            Agent::new("agent-purple", "Purple Agent", AgentRole::Purple),
        ],
    );

    let engine = TurnEngine::new(Arc::new(adapter()), EngineSettings::default());
    engine
        .execute_turn(&mut session, &host, &mut TurnState::new(), &mut TurnControl::detached(), |_| {})
        .await
        .unwrap();

    let messages = session.messages();
    assert_eq!(messages[0].content, "Live OpenAI reply");
    assert_eq!(messages[0].api_endpoint.as_deref(), Some("Provider: Fake openai"));
    assert_eq!(messages[0].request_body.as_deref(), Some("Model: gpt-4"));

    assert_eq!(messages[1].content, "Live Anthropic reply");
    assert_eq!(messages[1].request_body.as_deref(), Some("Model: claude-3-opus"));

    // Purple has no binding and uses its persona template
    assert!(messages[2].content.starts_with("Building on Blue's point: "));
    assert!(messages[2].api_endpoint.is_none());
    assert!(messages.iter().all(|m| m.score.is_some()));

    // Blue saw Red's live reply in its prompt
    let requests = log.lock().unwrap().clone();
    assert_eq!(requests.len(), 2);
    let blue_prompt = requests[1].body["messages"][0]["content"].as_str().unwrap();
    assert!(blue_prompt.contains("Live OpenAI reply"));
}

#[tokio::test]
async fn test_engine_falls_back_to_mock_on_http_error() {
    let (base, log) = spawn_fake_provider().await;
    let host = host_with(vec![provider("fake", "openai", format!("{}/broken", base))]);

    let mut session = Session::new(
        "Quieter streets",
        vec![
            Agent::new("agent-red", "Red Agent", AgentRole::Red).with_model("fake", "gpt-4"),
            Agent::new("agent-blue", "Blue Agent", AgentRole::Blue),
            Agent::new("agent-purple", "Purple Agent", AgentRole::Purple),
        ],
    );

    let engine = TurnEngine::new(Arc::new(adapter()), EngineSettings::default());
    let outcome = engine
        .execute_turn(&mut session, &host, &mut TurnState::new(), &mut TurnControl::detached(), |_| {})
        .await
        .unwrap();

    assert_eq!(outcome.generated, 3);
    let red = &session.messages()[0];
    assert!(red.content.starts_with("Building on the seed prompt \"Quieter streets\""));
    assert_eq!(red.api_endpoint.as_deref(), Some("Provider: fake"));
    assert_eq!(red.request_body.as_deref(), Some("Model: gpt-4"));
    assert!(red.score.is_some());
    assert_eq!(log.lock().unwrap().len(), 1);
}
