//! Axum HTTP front end for the agent, with body limits and timeouts.
//!
//! Routes:
//! - `GET  /health`: public liveness check
//! - `POST /api/v1/auth/token`: client credentials for a bearer token
//! - `POST /api/v1/tasks`: submit a goal, returns the task summary
//! - `GET  /api/v1/tasks?id=<id>`: task detail, or recent tasks without `id`
//! - `GET  /api/v1/tasks/stats`: record count with oldest and newest timestamps
//! - `GET  /metrics`: per-route counters in the Prometheus text format

pub mod auth;
mod handlers;
pub mod metrics;

pub use auth::{IssueError, IssuedToken, TokenIssuer};
pub use handlers::{ApiError, CreateTaskBody, TaskQuery, TaskSummary, TokenRequest};
pub use metrics::{GatewayMetrics, RouteCounts};

use handlers::{
    handle_create_task, handle_get_tasks, handle_health, handle_metrics, handle_task_stats,
    handle_token,
};

use crate::agent::{Agent, build_agent};
use crate::config::{Config, GatewayConfig};
use anyhow::Result;
use axum::{
    Router,
    http::StatusCode,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

/// Maximum request body size (64KB)
pub const MAX_BODY_SIZE: usize = 65_536;
/// Slack added on top of the agent deadline before the HTTP layer gives up
pub const TIMEOUT_MARGIN_SECS: u64 = 5;

/// Shared state for all axum handlers
#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<Agent>,
    pub tokens: Arc<TokenIssuer>,
    pub metrics: Arc<GatewayMetrics>,
    pub require_auth: bool,
    /// Deadline for one agent run
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(agent: Arc<Agent>, gateway: &GatewayConfig, request_timeout: Duration) -> Self {
        Self {
            agent,
            tokens: Arc::new(TokenIssuer::new(&gateway.clients, gateway.token_ttl_secs)),
            metrics: Arc::new(GatewayMetrics::new()),
            require_auth: gateway.require_auth,
            request_timeout,
        }
    }
}

pub fn router(state: AppState) -> Router {
    let http_timeout = state.request_timeout + Duration::from_secs(TIMEOUT_MARGIN_SECS);
    Router::new()
        .route("/health", get(handle_health))
        .route("/metrics", get(handle_metrics))
        .route("/api/v1/auth/token", post(handle_token))
        .route(
            "/api/v1/tasks",
            post(handle_create_task).get(handle_get_tasks),
        )
        .route("/api/v1/tasks/stats", get(handle_task_stats))
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            http_timeout,
        ))
}

/// Run the HTTP gateway until Ctrl-C.
pub async fn run_gateway(host: &str, port: u16, config: Config) -> Result<()> {
    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    run_gateway_with_listener(host, listener, config).await
}

/// Run the HTTP gateway from a pre-bound listener.
pub async fn run_gateway_with_listener(
    host: &str,
    listener: tokio::net::TcpListener,
    config: Config,
) -> Result<()> {
    if config.gateway.require_auth
        && !config
            .gateway
            .clients
            .iter()
            .any(|c| !c.id.trim().is_empty() && !c.secret.is_empty())
    {
        anyhow::bail!(
            "Refusing to start: [gateway] require_auth = true but no [[gateway.clients]] are configured.\n\
             Fix: add a client id/secret pair, or set require_auth = false for local testing."
        );
    }

    let actual_port = listener.local_addr()?.port();
    let agent = Arc::new(build_agent(&config).await?);
    let state = AppState::new(agent, &config.gateway, config.agent.request_timeout());

    println!("◆ chainpilot gateway listening on http://{host}:{actual_port}");
    println!("  GET  /health");
    println!("  POST /api/v1/auth/token");
    println!("  POST /api/v1/tasks");
    println!("  GET  /api/v1/tasks?id=<id>");
    println!("  GET  /api/v1/tasks/stats");
    println!("  GET  /metrics");
    if !state.require_auth {
        println!("  ! bearer auth disabled");
    }
    println!("  Press Ctrl+C to stop\n");
    tracing::info!(host, port = actual_port, "gateway started");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("gateway shutting down");
        })
        .await?;

    Ok(())
}
