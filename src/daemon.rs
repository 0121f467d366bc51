//! Daemon - the main gateway service
//!
//! Wires the provider clients and per-session controllers together and
//! serves the HTTP API until interrupted.

use tokio::sync::mpsc;

use crate::api::{ApiServerBuilder, ModelInfo};
use crate::chat::OpenAIResponder;
use crate::config::Config;
use crate::conversation::{ConversationController, SessionRegistry};
use crate::error::{Error, Result};
use crate::voice::{TextToSpeech, WhisperTranscriber};

/// The Sori daemon - serves the voice conversation API
#[derive(Debug)]
pub struct Daemon {
    config: Config,
}

impl Daemon {
    /// Create a new daemon instance
    ///
    /// # Errors
    ///
    /// Returns error if required credentials are missing
    pub fn new(config: Config) -> Result<Self> {
        if config.openai_api_key.is_none() {
            return Err(Error::Config("OPENAI_API_KEY is required".to_string()));
        }

        Ok(Self { config })
    }

    /// Run the daemon until interrupted
    ///
    /// # Errors
    ///
    /// Returns error if provider clients cannot be built or the API
    /// server fails
    pub async fn run(self) -> Result<()> {
        let api_key = self
            .config
            .openai_api_key
            .clone()
            .ok_or_else(|| Error::Config("OPENAI_API_KEY is required".to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(self.config.request_timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {e}")))?;

        let transcriber = WhisperTranscriber::new(
            client.clone(),
            api_key.clone(),
            self.config.voice.stt_model.clone(),
        )?;
        let responder = OpenAIResponder::new(client.clone(), api_key.clone())?;
        let synthesizer = TextToSpeech::from_config(&self.config.voice, client, Some(&api_key))?;

        let persona = self.config.persona.clone();
        let model = self.config.chat_model;
        let language = persona.language.clone();
        let port = self.config.api_server.port;

        tracing::info!(
            persona = %persona.name,
            model = %model,
            tts = %self.config.voice.tts_provider,
            "daemon running"
        );

        // Every session gets its own controller over shared clients.
        let sessions = SessionRegistry::new(move || {
            ConversationController::new(
                transcriber.clone(),
                responder.clone(),
                synthesizer.clone(),
                &persona,
                model,
            )
        });

        let model_info = ModelInfo {
            model_id: model.to_string(),
            provider: "openai".to_string(),
        };

        let server = ApiServerBuilder::new(sessions, port, model_info)
            .language(language)
            .static_dir(self.config.api_server.static_dir.clone())
            .build();
        let mut server_handle = server.spawn();

        // Set up shutdown signal
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                let _ = shutdown_tx.send(()).await;
            }
        });

        tokio::select! {
            _ = shutdown_rx.recv() => {
                tracing::info!("shutdown requested");
                server_handle.abort();
            }
            result = &mut server_handle => {
                match result {
                    Ok(outcome) => outcome?,
                    Err(e) => return Err(Error::Config(format!("API server task failed: {e}"))),
                }
            }
        }

        tracing::info!("daemon stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::ChatModel;
    use crate::config::{ApiServerConfig, VoiceConfig};
    use crate::persona::Persona;

    fn config_without_key() -> Config {
        Config {
            persona: Persona::default(),
            chat_model: ChatModel::default(),
            openai_api_key: None,
            voice: VoiceConfig::default(),
            api_server: ApiServerConfig {
                port: 0,
                static_dir: None,
            },
            request_timeout: std::time::Duration::from_secs(5),
        }
    }

    #[test]
    fn missing_api_key_is_rejected() {
        let err = Daemon::new(config_without_key()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn key_bearing_config_is_accepted() {
        let config = Config {
            openai_api_key: Some("sk-test".to_string()),
            ..config_without_key()
        };
        assert!(Daemon::new(config).is_ok());
    }
}
