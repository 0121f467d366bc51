//! API endpoint integration tests
//!
//! Exercises the routes that complete without reaching any provider.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use sori::api::{ApiState, GatewayController, ModelInfo, conversation, health};
use sori::chat::{ChatModel, OpenAIResponder};
use sori::conversation::{ConversationController, SessionRegistry};
use sori::persona::Persona;
use sori::voice::{TextToSpeech, WhisperTranscriber};

/// Build a test API router
fn build_test_router() -> axum::Router {
    let client = reqwest::Client::new();
    let transcriber = WhisperTranscriber::new(
        client.clone(),
        "sk-test".to_string(),
        "whisper-1".to_string(),
    )
    .unwrap();
    let responder = OpenAIResponder::new(client.clone(), "sk-test".to_string()).unwrap();
    let synthesizer = TextToSpeech::new_google_translate(client);

    let sessions: SessionRegistry<GatewayController> = SessionRegistry::new(move || {
        ConversationController::new(
            transcriber.clone(),
            responder.clone(),
            synthesizer.clone(),
            &Persona::default(),
            ChatModel::default(),
        )
    });

    let state = Arc::new(ApiState {
        sessions,
        model_info: ModelInfo {
            model_id: "gpt-3.5-turbo".to_string(),
            provider: "openai".to_string(),
        },
        language: "ko".to_string(),
    });

    axum::Router::new()
        .nest("/api/sessions", conversation::router(state.clone()))
        .merge(health::router())
        .merge(health::status_router(state))
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = build_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_status_endpoint() {
    let app = build_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["model"]["model_id"], "gpt-3.5-turbo");
    assert_eq!(json["model"]["provider"], "openai");
    assert_eq!(json["language"], "ko");
    assert_eq!(json["active_sessions"], 0);
}

#[tokio::test]
async fn test_create_session() {
    let app = build_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/sessions")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    // UUID session ids
    assert_eq!(json["session_id"].as_str().unwrap().len(), 36);
}

#[tokio::test]
async fn test_created_session_shows_in_status() {
    let app = build_test_router();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/sessions")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["active_sessions"], 1);
}

#[tokio::test]
async fn test_transcript_starts_empty() {
    let app = build_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/sessions/session-a/transcript")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["session_id"], "session-a");
    assert_eq!(json["turns"], serde_json::json!([]));
}

#[tokio::test]
async fn test_zero_duration_utterance_is_ignored() {
    let app = build_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/sessions/session-b/utterance?duration_ms=0")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["status"], "ignored");
}

#[tokio::test]
async fn test_utterance_after_reset_is_suppressed() {
    let app = build_test_router();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/sessions/session-c/reset")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // A stale recording posted after the reset never reaches the providers.
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/sessions/session-c/utterance?duration_ms=1500")
                .body(Body::from(vec![1u8, 2, 3]))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["status"], "ignored");
}

#[tokio::test]
async fn test_unknown_model_override_is_rejected() {
    let app = build_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/sessions/session-d/utterance?duration_ms=0&model=gpt-5")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_session() {
    let app = build_test_router();

    // Creating via transcript access, then deleting
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/sessions/session-e/transcript")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/sessions/session-e")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/sessions/session-e")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
