//! HTTP surface.
//!
//! | Method | Path         | Body                                   |
//! |--------|--------------|----------------------------------------|
//! | POST   | `/api/solve` | [`SolveRequestV1`] → [`SolveResponseV1`] |
//! | GET    | `/health`    | `{"status":"healthy","version":...}`   |
//!
//! Errors are `{"error": "..."}` with the status from
//! [`ServiceError::status_code`].

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::ServerConfig;
use crate::contract::{SolveRequestV1, SolveResponseV1};
use crate::error::ServiceError;
use crate::runner::run_solve;

struct AppState {
    config: ServerConfig,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "solve request failed");
        } else {
            info!(status = status.as_u16(), error = %self, "solve request rejected");
        }
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Build the application router for `config`.
#[must_use]
pub fn build_router(config: ServerConfig) -> Router {
    let cors = build_cors_layer(&config);
    let state = Arc::new(AppState { config });

    Router::new()
        .route("/api/solve", post(solve_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Serve on `0.0.0.0:port` until the process is stopped.
///
/// # Errors
///
/// Fails if the port cannot be bound or the server stops with an I/O error.
pub async fn start_server(port: u16, config: ServerConfig) -> anyhow::Result<()> {
    if let Some(warning) = config.security_warning() {
        warn!("SECURITY: {}", warning);
    }

    let app = build_router(config);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("chroma listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

/// CORS per [`ServerConfig::allowed_origins`]: none, any, or an explicit
/// list. Unparseable origins are dropped.
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    if config.allowed_origins.is_empty() {
        cors
    } else if config.allows_any_origin() {
        cors.allow_origin(AllowOrigin::any())
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(origins)
    }
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn solve_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SolveRequestV1>, JsonRejection>,
) -> Result<Json<SolveResponseV1>, ServiceError> {
    let Json(request) = payload.map_err(|rejection| ServiceError::MalformedRequest {
        detail: rejection.body_text(),
    })?;
    solve_blocking(state, request).await.map(Json)
}

/// Run the CPU-bound search off the async executor, bounded by the
/// configured timeout.
///
/// On timeout the response is sent immediately. The search thread is not
/// interrupted; it finishes (or hits the trace budget) and its result is
/// dropped.
async fn solve_blocking(
    state: Arc<AppState>,
    request: SolveRequestV1,
) -> Result<SolveResponseV1, ServiceError> {
    let limit = state.config.solve_timeout;
    let task = tokio::task::spawn_blocking(move || run_solve(&request, &state.config));
    match tokio::time::timeout(limit, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join)) => Err(ServiceError::Internal {
            detail: join.to_string(),
        }),
        Err(_) => Err(ServiceError::Timeout {
            millis: limit.as_millis(),
        }),
    }
}
