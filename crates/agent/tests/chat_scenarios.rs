//! End-to-end chat scenarios.
//!
//! The completion endpoint and both search providers run as in-process
//! axum servers, so every test drives the real HTTP clients.

use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use ragchat_agent::{ChatOrchestrator, ChatRequest, DISABLED_MESSAGE, RagSource};
use ragchat_config::AiConfig;
use ragchat_core::message::{Role, SessionId};
use ragchat_memory::InMemoryConversationStore;
use ragchat_retrieval::LocalRetriever;
use ragchat_search::{DuckDuckGoSearch, WebSearchClient, WikipediaSearch};
use serde_json::{Value, json};

// ── Mock completion endpoint ─────────────────────────────────────────────

#[derive(Clone, Default)]
struct CompletionMock {
    hits: Arc<AtomicUsize>,
    bodies: Arc<Mutex<Vec<Value>>>,
    auth: Arc<Mutex<Vec<String>>>,
    fixed_reply: Option<&'static str>,
}

impl CompletionMock {
    fn replying(reply: &'static str) -> Self {
        Self {
            fixed_reply: Some(reply),
            ..Default::default()
        }
    }

    fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    fn last_body(&self) -> Value {
        self.bodies.lock().unwrap().last().cloned().unwrap()
    }
}

async fn complete(
    State(mock): State<CompletionMock>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    let n = mock.hits.fetch_add(1, Ordering::SeqCst) + 1;
    mock.bodies.lock().unwrap().push(body);
    if let Some(auth) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
        mock.auth.lock().unwrap().push(auth.to_string());
    }

    let content = match mock.fixed_reply {
        Some(reply) => reply.to_string(),
        None => format!("reply {n}"),
    };
    Json(json!({
        "model": "mock-model",
        "choices": [{"message": {"role": "assistant", "content": content}}]
    }))
}

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

async fn completion_server(mock: CompletionMock) -> String {
    let router = Router::new()
        .route("/v1/chat/completions", post(complete))
        .with_state(mock);
    format!("{}/v1", serve(router).await)
}

// ── Helpers ──────────────────────────────────────────────────────────────

fn config(base_url: &str) -> AiConfig {
    AiConfig {
        enabled: true,
        api_base_url: base_url.to_string(),
        api_key: Some("test-key".into()),
        system_prompt: "You are a test assistant.".into(),
        enable_rag: false,
        enable_web_search: false,
        ..AiConfig::default()
    }
}

fn orchestrator(config: AiConfig, web: WebSearchClient, retriever: LocalRetriever) -> ChatOrchestrator {
    ChatOrchestrator::new(
        Arc::new(config),
        Arc::new(InMemoryConversationStore::new()),
        web,
        retriever,
    )
}

fn no_corpus() -> LocalRetriever {
    LocalRetriever::new("/nonexistent/ragchat/corpus")
}

fn system_message(body: &Value) -> String {
    assert_eq!(body["messages"][0]["role"], "system");
    body["messages"][0]["content"].as_str().unwrap().to_string()
}

// ── Scenario A: disabled configuration ───────────────────────────────────

#[tokio::test]
async fn disabled_config_fails_before_any_network_call() {
    let mock = CompletionMock::replying("never");
    let url = completion_server(mock.clone()).await;

    let search_hits = Arc::new(AtomicUsize::new(0));
    let counter = search_hits.clone();
    let search_url = serve(Router::new().route(
        "/",
        get(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Json(json!({"RelatedTopics": []}))
            }
        }),
    ))
    .await;
    let web = WebSearchClient::new().add(
        Arc::new(DuckDuckGoSearch::new(reqwest::Client::new(), format!("{search_url}/"), "test/1.0")),
        Duration::from_secs(5),
    );

    let disabled = AiConfig {
        enabled: false,
        enable_rag: true,
        enable_web_search: true,
        ..config(&url)
    };
    let orch = orchestrator(disabled, web, no_corpus());

    let err = orch.chat(ChatRequest::new("s1", "hi")).await.unwrap_err();
    assert!(err.is_config());
    assert_eq!(err.status_code(), 503);
    assert_eq!(err.to_string(), DISABLED_MESSAGE);

    assert_eq!(mock.hits(), 0);
    assert_eq!(search_hits.load(Ordering::SeqCst), 0);
    assert!(orch.store().get(&SessionId::normalize("s1")).await.is_empty());
}

// ── Scenario B: plain completion ─────────────────────────────────────────

#[tokio::test]
async fn plain_completion_without_retrieval() {
    let mock = CompletionMock::replying("Hello!");
    let url = completion_server(mock.clone()).await;
    let orch = orchestrator(config(&url), WebSearchClient::new(), no_corpus());

    let reply = orch.chat(ChatRequest::new("s1", "hi")).await.unwrap();

    assert_eq!(reply.reply, "Hello!");
    assert_eq!(reply.session_id, "s1");
    assert_eq!(reply.model, AiConfig::default().model);
    assert_eq!(reply.messages_in_memory, 2);
    assert!(reply.rag_sources.is_empty());
    assert!(reply.web_sources.is_empty());

    assert_eq!(mock.hits(), 1);
    assert_eq!(mock.auth.lock().unwrap().as_slice(), ["Bearer test-key"]);

    let body = mock.last_body();
    assert_eq!(body["model"], AiConfig::default().model);
    assert_eq!(body["max_tokens"], 512);
    assert_eq!(system_message(&body), "You are a test assistant.");
    assert_eq!(body["messages"][1], json!({"role": "user", "content": "hi"}));

    let history = orch.store().get(&SessionId::normalize("s1")).await;
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].role, Role::Assistant);
}

// ── Scenario C: local retrieval ranking ──────────────────────────────────

#[tokio::test]
async fn path_matching_file_outranks_unrelated_match() {
    let corpus = tempfile::tempdir().unwrap();
    let root = corpus.path();
    fs::create_dir_all(root.join("notes")).unwrap();
    fs::create_dir_all(root.join("misc")).unwrap();
    fs::write(
        root.join("notes/project.txt"),
        "Project deadline moved to Friday.\n",
    )
    .unwrap();
    fs::write(root.join("misc/other.txt"), "An update is pending.\n").unwrap();

    let mock = CompletionMock::replying("Friday.");
    let url = completion_server(mock.clone()).await;
    let retriever = LocalRetriever::new(root).with_source_base(root);
    let orch = orchestrator(config(&url), WebSearchClient::new(), retriever);

    let reply = orch
        .chat(ChatRequest::new("s1", "project deadline update").with_rag(true))
        .await
        .unwrap();

    assert_eq!(
        reply.rag_sources,
        vec![
            RagSource {
                source: "notes/project.txt".into(),
                line: 1,
            },
            RagSource {
                source: "misc/other.txt".into(),
                line: 1,
            },
        ]
    );

    let system = system_message(&mock.last_body());
    assert!(system.contains("Use the following context when relevant:"));
    assert!(system.contains("[LOCAL 1] notes/project.txt:1\nProject deadline moved to Friday."));
    assert!(system.contains("[LOCAL 2] misc/other.txt:1"));
}

// ── Scenario D: bounded history ──────────────────────────────────────────

#[tokio::test]
async fn history_is_bounded_to_most_recent_messages() {
    let mock = CompletionMock::default();
    let url = completion_server(mock.clone()).await;
    let bounded = AiConfig {
        max_history_messages: 4,
        ..config(&url)
    };
    let orch = orchestrator(bounded, WebSearchClient::new(), no_corpus());

    let mut reported = Vec::new();
    for turn in 1..=3 {
        let reply = orch
            .chat(ChatRequest::new("s1", format!("question {turn}")))
            .await
            .unwrap();
        reported.push(reply.messages_in_memory);
    }
    assert_eq!(reported, vec![2, 4, 4]);

    let history = orch.store().get(&SessionId::normalize("s1")).await;
    let contents: Vec<&str> = history.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["question 2", "reply 2", "question 3", "reply 3"]);

    // The third call replayed the four messages stored after turn two.
    let body = mock.last_body();
    assert_eq!(body["messages"].as_array().unwrap().len(), 1 + 4 + 1);
}

// ── Scenario E: search fallback on timeout ───────────────────────────────

#[tokio::test]
async fn primary_search_timeout_falls_back_to_secondary() {
    let slow = serve(Router::new().route(
        "/",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({"RelatedTopics": [{"Text": "Too late - x", "FirstURL": "https://late"}]}))
        }),
    ))
    .await;
    let wiki = serve(Router::new().route(
        "/w/api.php",
        get(|| async {
            Json(json!({"query": {"search": [
                {"title": "Rust (programming language)", "snippet": "A <span>systems</span>   language"}
            ]}}))
        }),
    ))
    .await;

    let client = reqwest::Client::new();
    let web = WebSearchClient::new()
        .add(
            Arc::new(DuckDuckGoSearch::new(client.clone(), format!("{slow}/"), "test/1.0")),
            Duration::from_millis(200),
        )
        .add(
            Arc::new(WikipediaSearch::new(client, format!("{wiki}/w/api.php"), "test/1.0")),
            Duration::from_secs(5),
        );

    let mock = CompletionMock::replying("It is a language.");
    let url = completion_server(mock.clone()).await;
    let orch = orchestrator(config(&url), web, no_corpus());

    let reply = orch
        .chat(ChatRequest::new("s1", "rust language").with_web_search(true))
        .await
        .unwrap();

    assert_eq!(reply.web_sources.len(), 1);
    let source = &reply.web_sources[0];
    assert_eq!(source.title, "Rust (programming language)");
    assert_eq!(source.link, "https://en.wikipedia.org/wiki/Rust_(programming_language)");
    assert_eq!(source.snippet, "A systems language");

    let system = system_message(&mock.last_body());
    assert!(system.contains("[WEB 1] Rust (programming language)"));
    assert!(system.contains("Summary: A systems language"));
}

#[tokio::test]
async fn primary_search_with_no_topics_falls_back_to_secondary() {
    let search = serve(
        Router::new()
            .route("/", get(|| async { Json(json!({"RelatedTopics": []})) }))
            .route(
                "/w/api.php",
                get(|| async {
                    Json(json!({"query": {"search": [{"title": "Tokio", "snippet": "runtime"}]}}))
                }),
            ),
    )
    .await;

    let client = reqwest::Client::new();
    let web = WebSearchClient::new()
        .add(
            Arc::new(DuckDuckGoSearch::new(client.clone(), format!("{search}/"), "test/1.0")),
            Duration::from_secs(5),
        )
        .add(
            Arc::new(WikipediaSearch::new(client, format!("{search}/w/api.php"), "test/1.0")),
            Duration::from_secs(5),
        );

    let mock = CompletionMock::replying("An async runtime.");
    let url = completion_server(mock.clone()).await;
    let orch = orchestrator(config(&url), web, no_corpus());

    let reply = orch
        .chat(ChatRequest::new("s1", "tokio").with_web_search(true))
        .await
        .unwrap();

    assert_eq!(reply.web_sources.len(), 1);
    assert_eq!(reply.web_sources[0].title, "Tokio");
    assert_eq!(reply.web_sources[0].link, "https://en.wikipedia.org/wiki/Tokio");
    assert!(system_message(&mock.last_body()).contains("[WEB 1] Tokio"));
}

// ── Search failure never fails the turn ──────────────────────────────────

#[tokio::test]
async fn both_search_providers_failing_still_answers() {
    let broken = serve(
        Router::new()
            .route("/", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
            .route("/w/api.php", get(|| async { "not json" })),
    )
    .await;

    let client = reqwest::Client::new();
    let web = WebSearchClient::new()
        .add(
            Arc::new(DuckDuckGoSearch::new(client.clone(), format!("{broken}/"), "test/1.0")),
            Duration::from_secs(5),
        )
        .add(
            Arc::new(WikipediaSearch::new(client, format!("{broken}/w/api.php"), "test/1.0")),
            Duration::from_secs(5),
        );

    let corpus = tempfile::tempdir().unwrap();
    fs::write(corpus.path().join("guide.txt"), "Install with cargo install ragchat.\n").unwrap();
    let retriever = LocalRetriever::new(corpus.path()).with_source_base(corpus.path());

    let mock = CompletionMock::replying("Use cargo.");
    let url = completion_server(mock.clone()).await;
    let enabled = AiConfig {
        enable_rag: true,
        enable_web_search: true,
        ..config(&url)
    };
    let orch = orchestrator(enabled, web, retriever);

    let reply = orch.chat(ChatRequest::new("s1", "install cargo")).await.unwrap();

    assert_eq!(reply.reply, "Use cargo.");
    assert!(reply.web_sources.is_empty());
    assert_eq!(reply.rag_sources.len(), 1);
    assert_eq!(reply.rag_sources[0].source, "guide.txt");

    let system = system_message(&mock.last_body());
    assert!(system.contains("Local project context:"));
    assert!(!system.contains("Internet search context:"));
}

// ── Upstream failures leave history untouched ────────────────────────────

#[tokio::test]
async fn upstream_error_message_is_surfaced_verbatim() {
    let router = Router::new().route(
        "/v1/chat/completions",
        post(|| async {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({"error": {"message": "Invalid credentials"}})),
            )
        }),
    );
    let url = format!("{}/v1", serve(router).await);
    let orch = orchestrator(config(&url), WebSearchClient::new(), no_corpus());

    let err = orch.chat(ChatRequest::new("s1", "hi")).await.unwrap_err();
    assert_eq!(err.status_code(), 502);
    assert_eq!(err.to_string(), "Invalid credentials");
    assert!(orch.store().get(&SessionId::normalize("s1")).await.is_empty());
}
