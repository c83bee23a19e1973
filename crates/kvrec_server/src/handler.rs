//! Request handlers.

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use kvrec_core::RequestAdapter;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

/// Shared state for all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The adapter that executes named operations.
    pub adapter: Arc<RequestAdapter>,
}

impl AppState {
    /// Creates handler state around an adapter.
    pub fn new(adapter: RequestAdapter) -> Self {
        Self {
            adapter: Arc::new(adapter),
        }
    }
}

/// Body of `POST /query`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueryRequest {
    /// Operation name, such as `todos` or `createTodo`.
    pub operation: String,
    /// Operation arguments.
    #[serde(default)]
    pub args: Value,
}

/// Successful response of `POST /query`.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
    /// The operation result.
    pub data: Value,
}

/// Builds the router with all routes and the body limit applied.
///
/// CORS and tracing layers are added by [`crate::QueryServer`].
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .route("/query", post(query))
        .route("/health", get(health))
        .route("/stats", get(stats))
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .with_state(state)
}

async fn query(State(state): State<AppState>, body: Bytes) -> ServerResult<Json<QueryResponse>> {
    let request: QueryRequest = serde_json::from_slice(&body)
        .map_err(|e| ServerError::InvalidRequest(format!("malformed query body: {e}")))?;
    tracing::debug!(operation = %request.operation, "query");

    let adapter = Arc::clone(&state.adapter);
    let data = tokio::task::spawn_blocking(move || {
        adapter.execute_named(&request.operation, &request.args)
    })
    .await
    .map_err(|e| ServerError::Internal(format!("query task failed: {e}")))??;

    Ok(Json(QueryResponse { data }))
}

async fn health() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
}

async fn stats(State(state): State<AppState>) -> Json<Value> {
    let db = state.adapter.database();
    let collections: Vec<Value> = db
        .layouts()
        .iter()
        .map(|(name, layout)| json!({ "name": name, "layout": layout }))
        .collect();
    Json(json!({
        "stats": db.stats().snapshot(),
        "collections": collections,
    }))
}
