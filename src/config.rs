//! Configuration management for the Sori gateway
//!
//! Settings come from the environment first, then from an optional TOML
//! file (`SORI_CONFIG`, or `config.toml` in the XDG config directory),
//! then from built-in defaults.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::chat::ChatModel;
use crate::error::Result;
use crate::persona::Persona;

/// Sori gateway configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Active persona
    pub persona: Persona,

    /// Chat model for reply generation
    pub chat_model: ChatModel,

    /// `OpenAI` API key (for Whisper, chat, and optional TTS)
    pub openai_api_key: Option<String>,

    /// Voice configuration
    pub voice: VoiceConfig,

    /// HTTP API server configuration
    pub api_server: ApiServerConfig,

    /// Timeout applied to every provider request
    pub request_timeout: Duration,
}

/// Voice processing configuration
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// STT model (e.g. "whisper-1")
    pub stt_model: String,

    /// TTS provider ("google-translate" or "openai")
    pub tts_provider: String,

    /// TTS voice identifier (`OpenAI` provider only)
    pub tts_voice: String,

    /// TTS speed multiplier (`OpenAI` provider only)
    pub tts_speed: f32,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            stt_model: default_stt_model(),
            tts_provider: default_tts_provider(),
            tts_voice: default_tts_voice(),
            tts_speed: default_tts_speed(),
        }
    }
}

/// HTTP API server configuration
#[derive(Debug, Clone)]
pub struct ApiServerConfig {
    /// Port to listen on
    pub port: u16,

    /// Path to static files directory (web UI)
    pub static_dir: Option<PathBuf>,
}

/// On-disk configuration file shape
///
/// Every field is optional; the environment wins over the file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    chat_model: Option<String>,
    language: Option<String>,
    persona_path: Option<PathBuf>,
    stt_model: Option<String>,
    tts_provider: Option<String>,
    tts_voice: Option<String>,
    tts_speed: Option<f32>,
    port: Option<u16>,
    static_dir: Option<PathBuf>,
    request_timeout_secs: Option<u64>,
}

impl Config {
    /// Load configuration from the environment and the config file
    ///
    /// # Errors
    ///
    /// Returns error if an explicit `SORI_CONFIG` file cannot be read or
    /// parsed, a persona file fails to load, or a model name is unknown
    pub fn load() -> Result<Self> {
        let file = Self::load_config_file()?;
        Self::resolve(file, &|name| std::env::var(name).ok())
    }

    /// Resolve the final configuration from a file and an environment
    fn resolve(file: ConfigFile, env: &dyn Fn(&str) -> Option<String>) -> Result<Self> {
        // Unset and empty variables are treated the same.
        let var = |name: &str| env(name).filter(|v| !v.is_empty());

        let persona_path = var("SORI_PERSONA").map(PathBuf::from).or(file.persona_path);
        let mut persona = match persona_path {
            Some(path) => Persona::load(path)?,
            None => Persona::default(),
        };
        if let Some(language) = var("SORI_LANGUAGE").or(file.language) {
            persona.language = language;
        }

        let chat_model = match var("SORI_CHAT_MODEL").or(file.chat_model) {
            Some(value) => value.parse()?,
            None => ChatModel::default(),
        };

        let openai_api_key = var("OPENAI_API_KEY");

        let voice = VoiceConfig {
            stt_model: var("SORI_STT_MODEL")
                .or(file.stt_model)
                .unwrap_or_else(default_stt_model),
            tts_provider: var("SORI_TTS_PROVIDER")
                .or(file.tts_provider)
                .unwrap_or_else(default_tts_provider),
            tts_voice: var("SORI_TTS_VOICE")
                .or(file.tts_voice)
                .unwrap_or_else(default_tts_voice),
            tts_speed: var("SORI_TTS_SPEED")
                .and_then(|s| s.parse().ok())
                .or(file.tts_speed)
                .unwrap_or_else(default_tts_speed),
        };

        let api_server = ApiServerConfig {
            port: var("SORI_PORT")
                .or_else(|| var("PORT"))
                .and_then(|s| s.parse().ok())
                .or(file.port)
                .unwrap_or_else(default_port),
            static_dir: var("SORI_STATIC_DIR").map(PathBuf::from).or(file.static_dir),
        };

        let request_timeout = Duration::from_secs(
            var("SORI_REQUEST_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .or(file.request_timeout_secs)
                .unwrap_or_else(default_request_timeout_secs),
        );

        Ok(Self {
            persona,
            chat_model,
            openai_api_key,
            voice,
            api_server,
            request_timeout,
        })
    }

    /// Load the config file, if one exists
    ///
    /// `SORI_CONFIG` names an explicit file and must parse; the default
    /// XDG location is best-effort.
    fn load_config_file() -> Result<ConfigFile> {
        if let Some(path) = std::env::var("SORI_CONFIG").ok().filter(|v| !v.is_empty()) {
            let content = std::fs::read_to_string(&path)?;
            let file = toml::from_str(&content)?;
            tracing::info!(path = %path, "loaded config file");
            return Ok(file);
        }

        let Some(dirs) = directories::ProjectDirs::from("dev", "sori", "sori") else {
            return Ok(ConfigFile::default());
        };
        let path = dirs.config_dir().join("config.toml");
        if !path.exists() {
            return Ok(ConfigFile::default());
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(file) => {
                    tracing::info!(path = %path.display(), "loaded config file");
                    Ok(file)
                }
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "failed to parse config file, using defaults"
                    );
                    Ok(ConfigFile::default())
                }
            },
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to read config file"
                );
                Ok(ConfigFile::default())
            }
        }
    }
}

// Default value functions

fn default_stt_model() -> String {
    "whisper-1".to_string()
}

fn default_tts_provider() -> String {
    "google-translate".to_string()
}

fn default_tts_voice() -> String {
    "alloy".to_string()
}

const fn default_tts_speed() -> f32 {
    1.0
}

const fn default_port() -> u16 {
    18800
}

const fn default_request_timeout_secs() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let env: HashMap<String, String> = HashMap::new();
        let config =
            Config::resolve(ConfigFile::default(), &|name| env.get(name).cloned()).unwrap();

        assert_eq!(config.chat_model, ChatModel::Gpt35Turbo);
        assert_eq!(config.persona.language, "ko");
        assert_eq!(config.voice.stt_model, "whisper-1");
        assert_eq!(config.voice.tts_provider, "google-translate");
        assert_eq!(config.api_server.port, 18800);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.openai_api_key.is_none());
    }

    #[test]
    fn environment_beats_config_file() {
        let file: ConfigFile = toml::from_str(
            r#"
            chat_model = "gpt-4"
            port = 9000
            tts_provider = "openai"
            "#,
        )
        .unwrap();
        let env = env_from(&[
            ("SORI_PORT", "9100"),
            ("SORI_CHAT_MODEL", "gpt-3.5-turbo"),
            ("OPENAI_API_KEY", "sk-test"),
        ]);

        let config = Config::resolve(file, &|name| env.get(name).cloned()).unwrap();
        assert_eq!(config.api_server.port, 9100);
        assert_eq!(config.chat_model, ChatModel::Gpt35Turbo);
        assert_eq!(config.voice.tts_provider, "openai");
        assert_eq!(config.openai_api_key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn unknown_chat_model_is_rejected() {
        let env = env_from(&[("SORI_CHAT_MODEL", "gpt-5")]);
        let err =
            Config::resolve(ConfigFile::default(), &|name| env.get(name).cloned()).unwrap_err();
        assert!(matches!(err, crate::error::Error::Config(_)));
    }

    #[test]
    fn empty_environment_values_are_ignored() {
        let env = env_from(&[("OPENAI_API_KEY", ""), ("SORI_LANGUAGE", "")]);
        let config =
            Config::resolve(ConfigFile::default(), &|name| env.get(name).cloned()).unwrap();
        assert!(config.openai_api_key.is_none());
        assert_eq!(config.persona.language, "ko");
    }

    #[test]
    fn unknown_file_keys_are_rejected() {
        let result: std::result::Result<ConfigFile, _> = toml::from_str("chat_mode = \"gpt-4\"");
        assert!(result.is_err());
    }

    #[test]
    fn persona_path_and_language_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("persona.json");
        std::fs::write(&path, r#"{"name": "echo", "language": "en"}"#).unwrap();

        let env = env_from(&[("SORI_PERSONA", path.to_str().unwrap())]);
        let config =
            Config::resolve(ConfigFile::default(), &|name| env.get(name).cloned()).unwrap();
        assert_eq!(config.persona.name, "echo");
        assert_eq!(config.persona.language, "en");

        let env = env_from(&[
            ("SORI_PERSONA", path.to_str().unwrap()),
            ("SORI_LANGUAGE", "ko"),
        ]);
        let config =
            Config::resolve(ConfigFile::default(), &|name| env.get(name).cloned()).unwrap();
        assert_eq!(config.persona.language, "ko");
    }

    #[test]
    fn fallback_port_variable_is_honored() {
        let env = env_from(&[("PORT", "8080")]);
        let config =
            Config::resolve(ConfigFile::default(), &|name| env.get(name).cloned()).unwrap();
        assert_eq!(config.api_server.port, 8080);
    }
}
