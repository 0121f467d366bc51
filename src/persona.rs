//! Persona configuration
//!
//! The persona fixes the assistant's system preamble and reply language.
//! A custom persona can be loaded from a JSON file; the default is the
//! deployed Korean assistant.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default system preamble, kept word-for-word from the deployed assistant
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a thoughtful assistant. Respond to all input in 25 words and answer in korea";

/// Default language code for speech synthesis
pub const DEFAULT_LANGUAGE: &str = "ko";

/// Identity and behavior of the assistant
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Persona {
    /// Display name
    pub name: String,

    /// System prompt seeding every conversation
    pub system_prompt: String,

    /// Language code passed to speech synthesis
    pub language: String,
}

impl Default for Persona {
    fn default() -> Self {
        Self {
            name: "sori".to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

impl Persona {
    /// Load a persona from a JSON file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, is not valid JSON, or
    /// declares an empty system prompt
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let persona: Self = serde_json::from_str(&content)?;

        if persona.system_prompt.trim().is_empty() {
            return Err(Error::Config(format!(
                "persona {} has an empty system prompt",
                path.display()
            )));
        }

        tracing::info!(name = %persona.name, path = %path.display(), "loaded persona");
        Ok(persona)
    }
}
