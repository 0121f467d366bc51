//! Error types for the Sori gateway

use thiserror::Error;

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the gateway
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Speech-to-text failure
    #[error("transcription error: {0}")]
    Transcription(ServiceFailure),

    /// Chat completion failure
    #[error("response error: {0}")]
    Response(ServiceFailure),

    /// Text-to-speech failure
    #[error("synthesis error: {0}")]
    Synthesis(ServiceFailure),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Why an upstream service call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Credential rejected by the provider
    InvalidCredential,
    /// Provider quota or rate limit hit
    RateLimited,
    /// Transport-level failure (connect, timeout, TLS)
    Network,
    /// The provider rejected the input itself (bad audio, unsupported language)
    UnsupportedInput,
    /// Any other upstream error
    Upstream,
}

impl FailureKind {
    /// Classify an HTTP status returned by a provider
    #[must_use]
    pub fn from_status(status: reqwest::StatusCode) -> Self {
        match status.as_u16() {
            401 | 403 => Self::InvalidCredential,
            429 => Self::RateLimited,
            400 | 404 | 415 | 422 => Self::UnsupportedInput,
            _ => Self::Upstream,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidCredential => "invalid credential",
            Self::RateLimited => "rate limited",
            Self::Network => "network",
            Self::UnsupportedInput => "unsupported input",
            Self::Upstream => "upstream",
        }
    }
}

/// A failed call to one of the external speech/chat services
#[derive(Debug, Clone)]
pub struct ServiceFailure {
    /// Broad cause, mapped from the HTTP status or transport error
    pub kind: FailureKind,
    /// Provider-reported detail
    pub message: String,
}

impl ServiceFailure {
    #[must_use]
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Build a failure from a non-success provider response
    #[must_use]
    pub fn status(status: reqwest::StatusCode, message: impl Into<String>) -> Self {
        Self::new(FailureKind::from_status(status), message)
    }

    /// Build a failure from a `reqwest` error
    ///
    /// A decode error means the provider answered with a body we could
    /// not parse; everything else is a transport problem.
    #[must_use]
    pub fn transport(err: &reqwest::Error) -> Self {
        let kind = if err.is_decode() {
            FailureKind::Upstream
        } else {
            FailureKind::Network
        };
        Self::new(kind, err.to_string())
    }
}

impl std::fmt::Display for ServiceFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind.as_str(), self.message)
    }
}
