//! Sori - voice conversation gateway
//!
//! This library provides the core functionality for the Sori gateway:
//! - Turn-taking conversation control with per-session transcripts
//! - Speech-to-text via Whisper
//! - Reply generation via chat completions
//! - Korean text-to-speech via Google Translate or `OpenAI`
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                  Browser client                      │
//! │   Capture  │  Playback  │  Transcript view          │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                  Sori Gateway                        │
//! │   Sessions  │  ConversationController  │  API       │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │            Speech and chat providers                 │
//! │   Whisper STT  │  Chat completions  │  TTS          │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod chat;
pub mod config;
pub mod conversation;
pub mod daemon;
pub mod error;
pub mod persona;
pub mod voice;

pub use chat::{ChatModel, OpenAIResponder, Responder};
pub use config::Config;
pub use conversation::{
    ConversationController, ConversationState, Exchange, ModelMessage, ModelRole,
    SessionRegistry, Speaker, Turn, TurnPhase, Utterance,
};
pub use daemon::Daemon;
pub use error::{Error, FailureKind, Result, ServiceFailure};
pub use persona::Persona;
pub use voice::{SpeechSynthesizer, TextToSpeech, Transcriber, WhisperTranscriber};
