use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};

use chainpilot::config::{ClientCredential, GatewayConfig};
use chainpilot::gateway::{AppState, router};
use chainpilot::task::FileTaskStore;

use super::fakes::{RecordingExecutor, StubBackend, StubReply, agent_with, options};

pub async fn spawn_gateway(backend: Arc<StubBackend>, request_timeout: Duration) -> String {
    let agent = agent_with(
        backend,
        RecordingExecutor::succeeding("balance=1.5 ETH"),
        Arc::new(FileTaskStore::ephemeral()),
        options(5),
    );
    let state = AppState::new(
        Arc::new(agent),
        &GatewayConfig {
            clients: vec![ClientCredential {
                id: "ops".into(),
                secret: "s3cret".into(),
            }],
            ..GatewayConfig::default()
        },
        request_timeout,
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.unwrap();
    });
    format!("http://{addr}")
}

pub async fn token(client: &reqwest::Client, base: &str) -> String {
    let body: Value = client
        .post(format!("{base}/api/v1/auth/token"))
        .json(&json!({"client_id": "ops", "client_secret": "s3cret"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    body["access_token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn submit_and_fetch_over_http() {
    let base = spawn_gateway(StubBackend::echo(), Duration::from_secs(10)).await;
    let client = reqwest::Client::new();

    let health: Value = client
        .get(format!("{base}/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "ok");

    let unauthorized = client
        .post(format!("{base}/api/v1/tasks"))
        .json(&json!({"goal": "hi"}))
        .send()
        .await
        .unwrap();
    assert_eq!(unauthorized.status(), 401);

    let token = token(&client, &base).await;
    let created = client
        .post(format!("{base}/api/v1/tasks"))
        .bearer_auth(&token)
        .json(&json!({
            "goal": "查询地址余额",
            "chain_action": "balance",
            "address": "0xabc"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(created.status(), 201);
    assert!(created.headers().contains_key("x-request-id"));
    let created: Value = created.json().await.unwrap();
    assert_eq!(created["observations"], "balance=1.5 ETH");
    let id = created["id"].as_i64().unwrap();

    let detail: Value = client
        .get(format!("{base}/api/v1/tasks"))
        .query(&[("id", id)])
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(detail["goal"], "查询地址余额");
    assert_eq!(detail["chain_action"], "balance");
    assert_eq!(detail["chain_id"], "11155111");

    let missing = client
        .get(format!("{base}/api/v1/tasks?id=9999"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), 404);
}

#[tokio::test]
async fn malformed_body_is_rejected_with_error_code() {
    let base = spawn_gateway(StubBackend::echo(), Duration::from_secs(10)).await;
    let client = reqwest::Client::new();
    let token = token(&client, &base).await;

    let response = client
        .post(format!("{base}/api/v1/tasks"))
        .bearer_auth(&token)
        .header("content-type", "application/json")
        .body("{\"not_goal\": 1}")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "invalid_input");
}

#[tokio::test]
async fn slow_reasoning_hits_request_deadline() {
    let base = spawn_gateway(StubBackend::new(StubReply::Hang), Duration::from_millis(200)).await;
    let client = reqwest::Client::new();
    let token = token(&client, &base).await;

    let response = client
        .post(format!("{base}/api/v1/tasks"))
        .bearer_auth(&token)
        .json(&json!({"goal": "think forever"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 504);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "timeout");
}
