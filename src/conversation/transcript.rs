//! Chat transcript and model history entry types

use chrono::Local;
use serde::{Deserialize, Serialize};

/// Who produced a transcript entry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

/// One visible chat entry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub speaker: Speaker,
    /// Wall-clock time of the exchange, formatted `HH:MM`
    pub timestamp: String,
    pub text: String,
}

impl Turn {
    /// Create a turn stamped with the current local time
    #[must_use]
    pub fn now(speaker: Speaker, text: impl Into<String>) -> Self {
        Self {
            speaker,
            timestamp: Local::now().format("%H:%M").to_string(),
            text: text.into(),
        }
    }
}

/// Role tag on a model-history entry, as sent to the chat API
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelRole {
    System,
    User,
    Assistant,
}

/// One entry of the history sent to the chat model
///
/// Serializes to the chat completions wire shape
/// (`{"role": "...", "content": "..."}`), so the stored history is exactly
/// what the provider receives.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelMessage {
    pub role: ModelRole,
    pub content: String,
}

impl ModelMessage {
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ModelRole::System,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ModelRole::User,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ModelRole::Assistant,
            content: content.into(),
        }
    }
}
