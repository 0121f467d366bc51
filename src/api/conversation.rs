//! Conversation endpoints
//!
//! The browser client posts captured audio here and gets back the
//! completed turn pair plus the synthesized reply. Sessions are created
//! on first use; an explicit create endpoint exists so clients can hold
//! a stable id across page reloads.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use base64::Engine;
use serde::{Deserialize, Serialize};

use super::ApiState;
use crate::chat::ChatModel;
use crate::conversation::{Turn, Utterance, mint_session_id};
use crate::error::{Error, FailureKind};

/// Response for session creation
#[derive(Serialize)]
pub struct SessionResponse {
    pub session_id: String,
}

/// Query parameters for an utterance report
#[derive(Deserialize)]
pub struct UtteranceParams {
    /// Capture duration as measured by the browser
    #[serde(default)]
    pub duration_ms: u64,

    /// Chat model override, sticky for the session
    pub model: Option<ChatModel>,
}

/// Outcome of an utterance report
#[derive(Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum UtteranceResponse {
    /// The turn ran to completion
    Completed {
        user: Turn,
        assistant: Turn,
        audio_base64: String,
        audio_format: &'static str,
    },
    /// Empty or suppressed capture, nothing happened
    Ignored,
}

/// Response for transcript retrieval
#[derive(Serialize)]
pub struct TranscriptResponse {
    pub session_id: String,
    pub turns: Vec<Turn>,
}

/// Create a new session
async fn create_session(
    State(state): State<Arc<ApiState>>,
) -> (StatusCode, Json<SessionResponse>) {
    let session_id = mint_session_id();
    state.sessions.find_or_create(&session_id).await;
    tracing::info!(session_id = %session_id, "session created");

    (StatusCode::CREATED, Json(SessionResponse { session_id }))
}

/// Report a captured utterance and run it through the turn pipeline
async fn utterance(
    State(state): State<Arc<ApiState>>,
    Path(session_id): Path<String>,
    Query(params): Query<UtteranceParams>,
    body: Bytes,
) -> Result<Json<UtteranceResponse>, ConversationError> {
    let controller = state.sessions.find_or_create(&session_id).await;
    let mut controller = controller.lock().await;

    if let Some(model) = params.model {
        controller.set_model(model);
    }

    let utterance = Utterance::new(body.to_vec(), Duration::from_millis(params.duration_ms));
    let response = match controller.ingest_utterance(&utterance).await? {
        Some(exchange) => UtteranceResponse::Completed {
            user: exchange.user,
            assistant: exchange.assistant,
            audio_base64: base64::engine::general_purpose::STANDARD.encode(&exchange.reply_audio),
            audio_format: "mp3",
        },
        None => UtteranceResponse::Ignored,
    };

    Ok(Json(response))
}

/// Get the full transcript for a session
async fn transcript(
    State(state): State<Arc<ApiState>>,
    Path(session_id): Path<String>,
) -> Json<TranscriptResponse> {
    let controller = state.sessions.find_or_create(&session_id).await;
    let turns = controller.lock().await.render().to_vec();

    Json(TranscriptResponse { session_id, turns })
}

/// Clear a session back to its initial state
async fn reset(State(state): State<Arc<ApiState>>, Path(session_id): Path<String>) -> StatusCode {
    let controller = state.sessions.find_or_create(&session_id).await;
    controller.lock().await.reset();

    StatusCode::NO_CONTENT
}

/// Drop a session entirely
async fn delete_session(
    State(state): State<Arc<ApiState>>,
    Path(session_id): Path<String>,
) -> StatusCode {
    if state.sessions.remove(&session_id).await {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

/// Build the conversation router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/", post(create_session))
        .route("/{session_id}/utterance", post(utterance))
        .route("/{session_id}/transcript", get(transcript))
        .route("/{session_id}/reset", post(reset))
        .route("/{session_id}", delete(delete_session))
        .with_state(state)
}

/// Error wrapper mapping gateway failures onto HTTP responses
pub struct ConversationError(Error);

impl From<Error> for ConversationError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ConversationError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            Error::Transcription(failure) => (status_for(failure.kind), "transcription_failed"),
            Error::Response(failure) => (status_for(failure.kind), "response_failed"),
            Error::Synthesis(failure) => (status_for(failure.kind), "synthesis_failed"),
            Error::Config(_) => (StatusCode::BAD_REQUEST, "configuration"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        };

        tracing::warn!(code, status = %status, error = %self.0, "request failed");

        let body = serde_json::json!({
            "error": { "code": code, "message": self.0.to_string() }
        });
        (status, Json(body)).into_response()
    }
}

const fn status_for(kind: FailureKind) -> StatusCode {
    match kind {
        FailureKind::InvalidCredential => StatusCode::UNAUTHORIZED,
        FailureKind::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        FailureKind::UnsupportedInput => StatusCode::BAD_REQUEST,
        FailureKind::Network | FailureKind::Upstream => StatusCode::BAD_GATEWAY,
    }
}
