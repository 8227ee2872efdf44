use std::time::Duration;

use serde_json::{Value, json};

use super::fakes::StubBackend;
use super::http_flow::{spawn_gateway, token};

#[tokio::test]
async fn stats_track_submitted_tasks() {
    let base = spawn_gateway(StubBackend::echo(), Duration::from_secs(10)).await;
    let client = reqwest::Client::new();

    let denied = client
        .get(format!("{base}/api/v1/tasks/stats"))
        .send()
        .await
        .unwrap();
    assert_eq!(denied.status(), 401);

    let token = token(&client, &base).await;
    let empty: Value = client
        .get(format!("{base}/api/v1/tasks/stats"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(empty["total"], 0);
    assert!(empty["oldest_created_at"].is_null());

    for goal in ["first", "second", "third"] {
        let created = client
            .post(format!("{base}/api/v1/tasks"))
            .bearer_auth(&token)
            .json(&json!({"goal": goal}))
            .send()
            .await
            .unwrap();
        assert_eq!(created.status(), 201);
    }

    let stats: Value = client
        .get(format!("{base}/api/v1/tasks/stats"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stats["total"], 3);
    let oldest = stats["oldest_created_at"].as_i64().unwrap();
    let newest = stats["newest_created_at"].as_i64().unwrap();
    assert!(oldest <= newest);
}

#[tokio::test]
async fn metrics_count_requests_and_errors_per_route() {
    let base = spawn_gateway(StubBackend::echo(), Duration::from_secs(10)).await;
    let client = reqwest::Client::new();

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
        .json(&json!({"goal": "hi"}))
        .send()
        .await
        .unwrap();
    assert_eq!(created.status(), 201);

    let response = client.get(format!("{base}/metrics")).send().await.unwrap();
    assert_eq!(response.status(), 200);
    assert!(
        response.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("text/plain")
    );
    let text = response.text().await.unwrap();

    assert!(text.contains("chainpilot_http_requests_total{route=\"create_task\"} 2"));
    assert!(text.contains("chainpilot_http_errors_total{route=\"create_task\"} 1"));
    assert!(text.contains("chainpilot_http_requests_total{route=\"auth_token\"} 1"));
    assert!(text.contains("chainpilot_http_errors_total{route=\"auth_token\"} 0"));
    assert!(text.contains(
        "chainpilot_http_request_duration_seconds_count{route=\"create_task\"} 2"
    ));
    assert!(text.contains(
        "chainpilot_http_request_duration_seconds_bucket{route=\"create_task\",le=\"+Inf\"} 2"
    ));
}
