//! Integration tests for the proxy endpoints against mocked upstreams

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use dlx_engine::api::{build_router, ApiState, SecretDigest};
use dlx_engine::center::CommandCenter;
use dlx_engine::compliance::ComplianceScanner;
use dlx_engine::config::{ChatProviderConfig, GeminiConfig};
use dlx_engine::deployment::SimulatedDeployer;
use dlx_engine::health::HealthMonitor;
use dlx_engine::lifecycle::SimulatedWork;
use dlx_engine::proxy::{BytebotClient, ChatClient, GeminiClient, ProxyGateway};
use dlx_engine::state::CommandState;
use sdk::types::ChronicleLogType;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn app_for(server: &MockServer) -> (Router, CommandCenter) {
    let gemini = GeminiConfig {
        base_url: server.uri(),
        ..GeminiConfig::default()
    };
    let groq = ChatProviderConfig {
        base_url: server.uri(),
        ..ChatProviderConfig::groq()
    };
    let openai = ChatProviderConfig {
        base_url: server.uri(),
        ..ChatProviderConfig::openai()
    };
    let proxies = ProxyGateway {
        gemini: GeminiClient::new(&gemini, Some("gemini-key".to_string())),
        groq: ChatClient::new("Groq", &groq, Some("groq-key".to_string())),
        openai: ChatClient::new("OpenAI", &openai, Some("openai-key".to_string())),
        bytebot: BytebotClient::new(&server.uri()),
    };

    let center = CommandCenter::new(
        CommandState::seeded(HealthMonitor::new(99.8, 85.0)),
        Arc::new(SimulatedWork::new(
            Duration::from_millis(3000),
            Duration::from_millis(5000),
        )),
        Arc::new(SimulatedDeployer::new(Duration::from_millis(3000))),
        ComplianceScanner::new(vec!["proprietary".to_string()]),
    );
    let state = ApiState::new(center.clone(), proxies, SecretDigest::new("lux2.0"));
    (build_router(state, None), center)
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn gemini_answer(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": { "parts": [{ "text": text }] },
            "groundingMetadata": {
                "groundingChunks": [
                    { "web": { "uri": "https://example.com/a", "title": "A" } },
                    { "web": { "uri": "", "title": "empty" } }
                ]
            }
        }]
    })
}

#[tokio::test]
async fn test_gemini_proxy_with_search() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.5-flash:generateContent"))
        .and(header("x-goog-api-key", "gemini-key"))
        .and(body_partial_json(json!({ "tools": [{ "googleSearch": {} }] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_answer("Grounded answer")))
        .mount(&server)
        .await;

    let (app, _) = app_for(&server);
    let (status, body) = post(
        &app,
        "/api/gemini",
        json!({ "contents": "What is new?", "useSearch": true }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], "Grounded answer");
    assert_eq!(
        body["sources"],
        json!([{ "uri": "https://example.com/a", "title": "A" }])
    );
}

#[tokio::test]
async fn test_gemini_missing_contents_is_400() {
    let server = MockServer::start().await;
    let (app, center) = app_for(&server);
    let before = center.read(|s| s.chronicle.len());

    let (status, body) = post(&app, "/api/gemini", json!({ "config": {} })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "A \"contents\" property is required in the request body."
    );
    assert_eq!(center.read(|s| s.chronicle.len()), before);
}

#[tokio::test]
async fn test_grok_proxy() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer groq-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": "Hello from Groq" } }]
        })))
        .mount(&server)
        .await;

    let (app, _) = app_for(&server);
    let (status, body) = post(&app, "/api/grok", json!({ "prompt": "hi" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], "Hello from Groq");
}

#[tokio::test]
async fn test_copilot_upstream_error_keeps_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": { "message": "Rate limit reached" }
        })))
        .mount(&server)
        .await;

    let (app, center) = app_for(&server);
    let (status, body) = post(&app, "/api/copilot", json!({ "prompt": "hi" })).await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert!(body["error"].as_str().unwrap().contains("Rate limit reached"));

    let latest = center.read(|s| s.chronicle.latest().cloned()).unwrap();
    assert_eq!(latest.kind, ChronicleLogType::Anomaly);
}

#[tokio::test]
async fn test_bytebot_task_created() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tasks"))
        .and(body_partial_json(json!({ "name": "Open browser" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "bt-1" })))
        .mount(&server)
        .await;

    let (app, _) = app_for(&server);
    let (status, body) = post(
        &app,
        "/api/bytebot/tasks",
        json!({ "name": "Open browser", "description": "Launch Firefox" }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["id"], "bt-1");
}

#[tokio::test]
async fn test_bytebot_error_body_forwarded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/desktop/mouse/click"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({ "message": "x out of range" })),
        )
        .mount(&server)
        .await;

    let (app, _) = app_for(&server);
    let (status, body) = post(
        &app,
        "/api/bytebot/desktop/mouse/click",
        json!({ "x": -1, "y": 0 }),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "x out of range");
}

#[tokio::test]
async fn test_ideation_adds_children() {
    let server = MockServer::start().await;
    let ideas = json!({ "ideas": ["Latency budget", "Failover", "  "] }).to_string();
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.5-flash:generateContent"))
        .and(body_partial_json(json!({
            "generationConfig": { "responseMimeType": "application/json" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_answer(&ideas)))
        .mount(&server)
        .await;

    let (app, center) = app_for(&server);
    let (status, body) = post(&app, "/api/mindmap/nodes/architecture/ideate", json!({})).await;

    assert_eq!(status, StatusCode::CREATED);
    let children = body.as_array().unwrap();
    assert_eq!(children.len(), 2);
    assert!(children.iter().all(|c| c["parentId"] == "architecture"));

    let latest = center.read(|s| s.chronicle.latest().cloned()).unwrap();
    assert_eq!(latest.message, "AI Ideation successful: Generated 2 new nodes.");
}

#[tokio::test]
async fn test_ideation_unparseable_answer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.5-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_answer("not json")))
        .mount(&server)
        .await;

    let (app, center) = app_for(&server);
    let before = center.read(|s| s.mind_map.list().len());
    let (status, _) = post(&app, "/api/mindmap/nodes/vision/ideate", json!({})).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(center.read(|s| s.mind_map.list().len()), before);
    let latest = center.read(|s| s.chronicle.latest().cloned()).unwrap();
    assert_eq!(latest.message, "AI Ideation failed: Could not parse AI response.");
}

#[tokio::test]
async fn test_ideation_with_no_ideas_is_invalid() {
    let server = MockServer::start().await;
    let empty = json!({ "ideas": [] }).to_string();
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.5-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_answer(&empty)))
        .mount(&server)
        .await;

    let (app, center) = app_for(&server);
    let before = center.read(|s| s.mind_map.list().len());
    let (status, body) = post(&app, "/api/mindmap/nodes/vision/ideate", json!({})).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("Received an invalid response from the AI."));
    assert_eq!(center.read(|s| s.mind_map.list().len()), before);

    let latest = center.read(|s| s.chronicle.latest().cloned()).unwrap();
    assert_eq!(latest.kind, ChronicleLogType::Anomaly);
    assert_eq!(
        latest.message,
        "AI Ideation failed: Received an invalid response from the AI."
    );
    let reported_success = center.read(|s| {
        s.chronicle
            .entries()
            .iter()
            .any(|e| e.message.starts_with("AI Ideation successful"))
    });
    assert!(!reported_success);
}

#[tokio::test]
async fn test_ideation_with_wrong_shape_is_invalid() {
    let server = MockServer::start().await;
    let wrong = json!({ "suggestions": ["Failover"] }).to_string();
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.5-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_answer(&wrong)))
        .mount(&server)
        .await;

    let (app, center) = app_for(&server);
    let (status, _) = post(&app, "/api/mindmap/nodes/vision/ideate", json!({})).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let latest = center.read(|s| s.chronicle.latest().cloned()).unwrap();
    assert_eq!(
        latest.message,
        "AI Ideation failed: Received an invalid response from the AI."
    );
}

#[tokio::test]
async fn test_ideation_on_promoted_node_rejected() {
    let server = MockServer::start().await;
    let (app, _) = app_for(&server);

    let (status, body) = post(
        &app,
        "/api/mindmap/nodes/mindmap-ai-ideation-node/ideate",
        json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["reason"], "node_already_promoted");
}
