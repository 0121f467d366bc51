//! HTTP API server for the Sori gateway

pub mod conversation;
pub mod health;

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::chat::OpenAIResponder;
use crate::conversation::{ConversationController, SessionRegistry};
use crate::error::{Error, Result};
use crate::voice::{TextToSpeech, WhisperTranscriber};

/// Controller type served by this API
pub type GatewayController =
    ConversationController<WhisperTranscriber, OpenAIResponder, TextToSpeech>;

/// Information about the current chat model
#[derive(Debug, Clone, serde::Serialize)]
pub struct ModelInfo {
    pub model_id: String,
    pub provider: String,
}

/// Shared state for API handlers
pub struct ApiState {
    /// Per-session conversation controllers
    pub sessions: SessionRegistry<GatewayController>,

    /// Active chat model
    pub model_info: ModelInfo,

    /// Synthesis language code
    pub language: String,
}

/// Configuration for building an API server
pub struct ApiServerBuilder {
    sessions: SessionRegistry<GatewayController>,
    port: u16,
    model_info: ModelInfo,
    language: String,
    static_dir: Option<PathBuf>,
}

impl ApiServerBuilder {
    /// Create a new API server builder
    #[must_use]
    pub fn new(
        sessions: SessionRegistry<GatewayController>,
        port: u16,
        model_info: ModelInfo,
    ) -> Self {
        Self {
            sessions,
            port,
            model_info,
            language: crate::persona::DEFAULT_LANGUAGE.to_string(),
            static_dir: None,
        }
    }

    /// Set the synthesis language reported by the status endpoint
    #[must_use]
    pub fn language(mut self, language: String) -> Self {
        self.language = language;
        self
    }

    /// Set the static files directory for serving the web UI
    #[must_use]
    pub fn static_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.static_dir = dir;
        self
    }

    /// Build the API server
    #[must_use]
    pub fn build(self) -> ApiServer {
        let state = Arc::new(ApiState {
            sessions: self.sessions,
            model_info: self.model_info,
            language: self.language,
        });

        ApiServer {
            state,
            port: self.port,
            static_dir: self.static_dir,
        }
    }
}

/// API server
pub struct ApiServer {
    state: Arc<ApiState>,
    port: u16,
    static_dir: Option<PathBuf>,
}

impl ApiServer {
    /// Build the router with all routes
    fn router(&self) -> Router {
        let mut router = Router::new()
            .nest("/api/sessions", conversation::router(self.state.clone()))
            .merge(health::router())
            .merge(health::status_router(self.state.clone()));

        // Serve static files if configured
        if let Some(static_dir) = &self.static_dir {
            let index_file = static_dir.join("index.html");
            let serve_dir =
                ServeDir::new(static_dir).not_found_service(ServeFile::new(&index_file));

            router = router.fallback_service(serve_dir);
            tracing::info!(path = %static_dir.display(), "serving static files");
        }

        // CORS layer for cross-origin requests from the browser client
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        router.layer(cors).layer(TraceLayer::new_for_http())
    }

    /// Run the API server
    ///
    /// # Errors
    ///
    /// Returns error if server fails to bind or run
    pub async fn run(self) -> Result<()> {
        let addr = format!("0.0.0.0:{}", self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| Error::Config(format!("failed to bind API server: {e}")))?;

        tracing::info!(port = self.port, "API server listening");

        axum::serve(listener, self.router())
            .await
            .map_err(|e| Error::Config(format!("API server error: {e}")))?;

        Ok(())
    }

    /// Run the API server in a background task
    #[must_use]
    pub fn spawn(self) -> tokio::task::JoinHandle<Result<()>> {
        tokio::spawn(async move { self.run().await })
    }
}
