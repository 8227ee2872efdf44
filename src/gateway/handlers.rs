use super::AppState;
use super::auth::IssueError;
use crate::agent::RequestContext;
use crate::error::{AgentError, ReasoningError, StoreError};
use crate::task::Task;
use crate::utils::sanitize_api_error;
use axum::{
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use super::metrics::GatewayMetrics;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

/// Default page size for `GET /api/v1/tasks`.
pub const DEFAULT_LIST_LIMIT: usize = 20;
pub const MAX_LIST_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateTaskBody {
    pub goal: String,
    #[serde(default)]
    pub chain_action: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TaskQuery {
    pub id: Option<i64>,
    pub limit: Option<usize>,
}

/// What `POST /api/v1/tasks` returns.
#[derive(Debug, Serialize)]
pub struct TaskSummary {
    pub id: i64,
    pub reply: String,
    pub observations: String,
    pub chain_id: String,
    pub block_number: String,
    pub created_at: i64,
}

impl From<Task> for TaskSummary {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            reply: task.reply,
            observations: task.observations,
            chain_id: task.chain_id,
            block_number: task.block_number,
            created_at: task.created_at,
        }
    }
}

/// `{code, message}` error body with its status.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    fn unauthorized() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "Missing or invalid bearer token. Obtain one from POST /api/v1/auth/token",
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({"code": self.code, "message": self.message});
        (self.status, Json(body)).into_response()
    }
}

impl From<AgentError> for ApiError {
    fn from(err: AgentError) -> Self {
        let status = match &err {
            AgentError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AgentError::Storage(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            AgentError::Reasoning(ReasoningError::Timeout(_)) | AgentError::Timeout { .. } => {
                StatusCode::GATEWAY_TIMEOUT
            }
            AgentError::Reasoning(_) | AgentError::ChainExecution(_) => StatusCode::BAD_GATEWAY,
            AgentError::Cancelled { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AgentError::Storage(_) | AgentError::KnowledgeLookup(_) | AgentError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, err.code(), sanitize_api_error(&err.to_string()))
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        AgentError::from(err).into()
    }
}

/// Run a handler body inside a span tagged with a fresh request id, echo
/// the id back in `x-request-id`, and count the outcome in `metrics`.
async fn traced<F>(metrics: Arc<GatewayMetrics>, route: &'static str, handler: F) -> Response
where
    F: Future<Output = Result<Response, ApiError>>,
{
    let started = Instant::now();
    let request_id = uuid::Uuid::new_v4().to_string();
    let span = tracing::info_span!("request", %request_id, route);
    let mut response = match handler.instrument(span.clone()).await {
        Ok(response) => response,
        Err(err) => {
            span.in_scope(|| {
                if err.status.is_server_error() {
                    tracing::warn!(status = err.status.as_u16(), code = err.code, "request failed");
                } else {
                    tracing::debug!(status = err.status.as_u16(), code = err.code, "request rejected");
                }
            });
            err.into_response()
        }
    };
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert("x-request-id", value);
    }
    metrics.record(route, response.status(), started.elapsed());
    response
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    if !state.require_auth {
        return Ok(());
    }
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or("")
        .trim();
    if state.tokens.is_authenticated(token) {
        Ok(())
    } else {
        Err(ApiError::unauthorized())
    }
}

fn invalid_json(err: &JsonRejection) -> ApiError {
    ApiError::new(
        StatusCode::BAD_REQUEST,
        "invalid_input",
        format!("Invalid JSON: {}", err.body_text()),
    )
}

/// GET /health: always public
pub(super) async fn handle_health(State(state): State<AppState>) -> impl IntoResponse {
    let started = Instant::now();
    let body = Json(serde_json::json!({
        "status": "ok",
        "store": state.agent.store().name(),
        "require_auth": state.require_auth,
    }));
    state
        .metrics
        .record("health", StatusCode::OK, started.elapsed());
    body
}

/// GET /metrics: public, like `/health`
pub(super) async fn handle_metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; version=0.0.4"),
        )],
        state.metrics.render(),
    )
}

/// POST /api/v1/auth/token: exchange client credentials for a bearer token
pub(super) async fn handle_token(
    State(state): State<AppState>,
    body: Result<Json<TokenRequest>, JsonRejection>,
) -> Response {
    traced(Arc::clone(&state.metrics), "auth_token", async move {
        let Json(request) = body.map_err(|e| invalid_json(&e))?;
        match state.tokens.issue(&request.client_id, &request.client_secret) {
            Ok(token) => {
                tracing::info!(client_id = %request.client_id.trim(), "bearer token issued");
                Ok(Json(serde_json::json!({
                    "access_token": token.access_token,
                    "token_type": "Bearer",
                    "expires_in": token.expires_in,
                }))
                .into_response())
            }
            Err(IssueError::InvalidCredentials) => {
                tracing::warn!("token request with invalid client credentials");
                Err(ApiError::new(
                    StatusCode::UNAUTHORIZED,
                    "invalid_credentials",
                    "Invalid client credentials",
                ))
            }
            Err(IssueError::LockedOut(retry_after)) => {
                tracing::warn!(retry_after, "token issuing locked out after repeated failures");
                let body = serde_json::json!({
                    "code": "locked_out",
                    "message": format!("Too many failed attempts. Try again in {retry_after}s."),
                    "retry_after": retry_after,
                });
                Ok((StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response())
            }
        }
    })
    .await
}

/// POST /api/v1/tasks: run one orchestration cycle
pub(super) async fn handle_create_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<CreateTaskBody>, JsonRejection>,
) -> Response {
    traced(Arc::clone(&state.metrics), "create_task", async move {
        authorize(&state, &headers)?;
        let Json(body) = body.map_err(|e| invalid_json(&e))?;

        // Dropping this future on client disconnect aborts in-flight backend calls.
        let ctx = RequestContext::with_timeout(state.request_timeout);
        let task = state
            .agent
            .run(
                &ctx,
                &body.goal,
                body.chain_action.as_deref().unwrap_or(""),
                body.address.as_deref().unwrap_or(""),
            )
            .await?;

        Ok((StatusCode::CREATED, Json(TaskSummary::from(task))).into_response())
    })
    .await
}

/// GET /api/v1/tasks?id=<id>: task detail, or recent tasks without `id`
pub(super) async fn handle_get_tasks(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<TaskQuery>, QueryRejection>,
) -> Response {
    traced(Arc::clone(&state.metrics), "get_tasks", async move {
        authorize(&state, &headers)?;
        let Query(query) = query.map_err(|e| {
            ApiError::new(StatusCode::BAD_REQUEST, "invalid_input", e.body_text())
        })?;
        let store = state.agent.store();

        if let Some(id) = query.id {
            let task = store.get(id).await?;
            return Ok(Json(task).into_response());
        }

        let limit = query
            .limit
            .unwrap_or(DEFAULT_LIST_LIMIT)
            .clamp(1, MAX_LIST_LIMIT);
        let tasks = store.recent_by_time(limit).await?;
        Ok(Json(serde_json::json!({ "tasks": tasks })).into_response())
    })
    .await
}

/// GET /api/v1/tasks/stats: ledger size and time span
pub(super) async fn handle_task_stats(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    traced(Arc::clone(&state.metrics), "task_stats", async move {
        authorize(&state, &headers)?;
        let store = state.agent.store();
        let stats = store.stats().await?;
        Ok(Json(serde_json::json!({
            "store": store.name(),
            "total": stats.total,
            "oldest_created_at": stats.oldest_created_at,
            "newest_created_at": stats.newest_created_at,
        }))
        .into_response())
    })
    .await
}
