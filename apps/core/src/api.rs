//! HTTP surface over the session API.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::actors::{HistoryEntry, SessionSnapshot, SupervisorHandle};
use crate::brain::{TurnKind, TurnMetadata};
use crate::error::AppError;
use crate::models::StudentProfile;

#[derive(Clone)]
pub struct AppState {
    pub supervisor: SupervisorHandle,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub session_id: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct StartSessionResponse {
    pub success: bool,
    pub session_id: Uuid,
    pub response: String,
    #[serde(rename = "type")]
    pub kind: TurnKind,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub success: bool,
    pub response: String,
    #[serde(rename = "type")]
    pub kind: TurnKind,
    pub profile: StudentProfile,
    pub metadata: TurnMetadata,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub success: bool,
    #[serde(flatten)]
    pub snapshot: SessionSnapshot,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub success: bool,
    pub session_id: Uuid,
    pub history: Vec<HistoryEntry>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::SessionLimitReached(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Request rejected: {}", self);
        }

        let body = Json(json!({ "success": false, "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

fn parse_session_id(raw: &str) -> Result<Uuid, AppError> {
    Ok(Uuid::parse_str(raw.trim())?)
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(banner))
        .route("/health", get(health_check))
        .route("/api/sessions", post(start_session))
        .route("/api/sessions/{session_id}", delete(end_session))
        .route("/api/chat", post(chat))
        .route("/api/reset", post(reset))
        .route("/api/profile/{session_id}", get(get_profile))
        .route("/api/history/{session_id}", get(get_history))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds `addr` and serves until `shutdown` resolves.
pub async fn serve(
    addr: &str,
    state: AppState,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Career counselor API listening on {}", listener.local_addr()?);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

async fn banner() -> Json<Value> {
    Json(json!({
        "message": "Student Career Pathway Recommender API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "start_session": "POST /api/sessions",
            "end_session": "DELETE /api/sessions/{session_id}",
            "chat": "POST /api/chat",
            "reset": "POST /api/reset",
            "profile": "GET /api/profile/{session_id}",
            "history": "GET /api/history/{session_id}",
            "health": "GET /health"
        }
    }))
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "healthy", "timestamp": Utc::now().to_rfc3339() }))
}

async fn start_session(
    State(state): State<AppState>,
) -> Result<Json<StartSessionResponse>, AppError> {
    let (session_id, greeting) = state.supervisor.start_session().await?;
    Ok(Json(StartSessionResponse {
        success: true,
        session_id,
        response: greeting.text,
        kind: greeting.kind,
    }))
}

async fn end_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let session_id = parse_session_id(&session_id)?;
    state.supervisor.end_session(session_id).await?;
    Ok(Json(json!({ "success": true, "session_id": session_id })))
}

async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let Json(req) = payload?;
    let session_id = parse_session_id(&req.session_id)?;
    let turn = state.supervisor.send_turn(session_id, req.message).await?;
    Ok(Json(ChatResponse {
        success: true,
        response: turn.text,
        kind: turn.kind,
        profile: turn.profile,
        metadata: turn.metadata,
    }))
}

async fn reset(
    State(state): State<AppState>,
    payload: Result<Json<ResetRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(req) = payload?;
    let session_id = parse_session_id(&req.session_id)?;
    let greeting = state.supervisor.reset_session(session_id).await?;
    Ok(Json(json!({ "success": true, "response": greeting.text })))
}

async fn get_profile(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ProfileResponse>, AppError> {
    let session_id = parse_session_id(&session_id)?;
    let snapshot = state.supervisor.get_profile(session_id).await?;
    Ok(Json(ProfileResponse {
        success: true,
        snapshot,
    }))
}

async fn get_history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<HistoryResponse>, AppError> {
    let session_id = parse_session_id(&session_id)?;
    let history = state.supervisor.get_history(session_id).await?;
    Ok(Json(HistoryResponse {
        success: true,
        session_id,
        history,
    }))
}
