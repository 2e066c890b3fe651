//! Router and handlers.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use tower_http::trace::TraceLayer;

use super::types::PingResponse;
use crate::agent::Agent;
use crate::config::Config;
use crate::entrypoint::{self, EntrypointError};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<Agent>,
    pub started_at: i64,
}

pub fn router(agent: Arc<Agent>) -> Router {
    let state = AppState {
        agent,
        started_at: chrono::Utc::now().timestamp(),
    };

    Router::new()
        .route("/invocations", post(invocations))
        .route("/ping", get(ping))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Build the agent and serve until the process is stopped.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let agent = Arc::new(Agent::from_config(&config).await?);
    let app = router(agent);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Agent runtime listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

/// GET /ping
async fn ping(State(state): State<AppState>) -> Json<PingResponse> {
    Json(PingResponse {
        status: "Healthy".to_string(),
        time_of_last_update: state.started_at,
    })
}

/// POST /invocations - reply text as a JSON string.
async fn invocations(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<Json<String>, (StatusCode, String)> {
    entrypoint::handle_payload(&state.agent, &payload)
        .await
        .map(Json)
        .map_err(|e| {
            let status = match e {
                EntrypointError::MissingPrompt | EntrypointError::InvalidJson(_) => {
                    StatusCode::BAD_REQUEST
                }
                EntrypointError::EmptyResponse | EntrypointError::Agent(_) => {
                    tracing::error!(error = %e, "Invocation failed");
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            };
            (status, e.to_string())
        })
}
