//! Text-to-speech: the synthesis stage

use async_trait::async_trait;

use crate::config::VoiceConfig;
use crate::error::{Error, FailureKind, Result, ServiceFailure};

/// Longest text the Google Translate endpoint accepts per request
const GOOGLE_TTS_MAX_CHARS: usize = 100;

/// Synthesizes reply text into speech
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` into encoded audio (MP3), spoken in `language`
    async fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>>;
}

/// TTS provider backend
#[derive(Clone, Copy, Debug)]
enum TtsProvider {
    GoogleTranslate,
    OpenAI,
}

/// Synthesizes speech from text
#[derive(Clone, Debug)]
pub struct TextToSpeech {
    client: reqwest::Client,
    api_key: Option<String>,
    voice: String,
    speed: f32,
    model: String,
    provider: TtsProvider,
}

impl TextToSpeech {
    /// Create a TTS instance using the keyless Google Translate endpoint
    #[must_use]
    pub fn new_google_translate(client: reqwest::Client) -> Self {
        Self {
            client,
            api_key: None,
            // Google Translate has no voice, speed, or model knobs
            voice: String::new(),
            speed: 1.0,
            model: String::new(),
            provider: TtsProvider::GoogleTranslate,
        }
    }

    /// Create a TTS instance using `OpenAI`
    ///
    /// # Errors
    ///
    /// Returns error if API key is missing
    pub fn new_openai(
        client: reqwest::Client,
        api_key: String,
        voice: String,
        speed: f32,
    ) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config("OpenAI API key required for TTS".to_string()));
        }

        Ok(Self {
            client,
            api_key: Some(api_key),
            voice,
            speed,
            model: "tts-1".to_string(),
            provider: TtsProvider::OpenAI,
        })
    }

    /// Build the synthesizer selected by the voice configuration
    ///
    /// # Errors
    ///
    /// Returns error if the provider name is unknown, or the `OpenAI`
    /// backend is selected without an API key
    pub fn from_config(
        config: &VoiceConfig,
        client: reqwest::Client,
        api_key: Option<&str>,
    ) -> Result<Self> {
        match config.tts_provider.as_str() {
            "google-translate" => Ok(Self::new_google_translate(client)),
            "openai" => {
                let key = api_key.ok_or_else(|| {
                    Error::Config("OpenAI API key required for TTS".to_string())
                })?;
                Self::new_openai(
                    client,
                    key.to_string(),
                    config.tts_voice.clone(),
                    config.tts_speed,
                )
            }
            other => Err(Error::Config(format!("unknown TTS provider: {other}"))),
        }
    }

    /// Synthesize using the Google Translate endpoint
    ///
    /// Text beyond the per-request limit is split on whitespace and the
    /// MP3 segments concatenated; MP3 frames are self-delimiting, so the
    /// result plays as one stream.
    async fn synthesize_google(&self, text: &str, language: &str) -> Result<Vec<u8>> {
        let chunks = split_text(text, GOOGLE_TTS_MAX_CHARS);
        tracing::debug!(
            chunks = chunks.len(),
            language = %language,
            "starting Google Translate synthesis"
        );

        let mut audio = Vec::new();
        for chunk in &chunks {
            let url = format!(
                "https://translate.google.com/translate_tts?ie=UTF-8&client=tw-ob&tl={}&q={}",
                urlencoding::encode(language),
                urlencoding::encode(chunk)
            );

            let response = self.client.get(&url).send().await.map_err(|e| {
                tracing::error!(error = %e, "Google Translate TTS request failed");
                Error::Synthesis(ServiceFailure::transport(&e))
            })?;

            let status = response.status();
            if !status.is_success() {
                // The endpoint reports an unknown language code as 404.
                tracing::error!(status = %status, language = %language, "Google Translate TTS error");
                return Err(Error::Synthesis(ServiceFailure::status(
                    status,
                    format!("Google Translate TTS error {status} for language {language:?}"),
                )));
            }

            let bytes = response.bytes().await.map_err(|e| {
                tracing::error!(error = %e, "failed to read synthesis response");
                Error::Synthesis(ServiceFailure::transport(&e))
            })?;
            audio.extend_from_slice(&bytes);
        }

        tracing::info!(bytes = audio.len(), "synthesis complete");
        Ok(audio)
    }

    /// Synthesize using `OpenAI` TTS
    ///
    /// The endpoint has no language parameter; the configured voice
    /// carries the accent.
    async fn synthesize_openai(&self, text: &str) -> Result<Vec<u8>> {
        #[derive(serde::Serialize)]
        struct TtsRequest<'a> {
            model: &'a str,
            input: &'a str,
            voice: &'a str,
            speed: f32,
        }

        let request = TtsRequest {
            model: &self.model,
            input: text,
            voice: &self.voice,
            speed: self.speed,
        };

        let api_key = self.api_key.as_deref().unwrap_or_default();
        let response = self
            .client
            .post("https://api.openai.com/v1/audio/speech")
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "OpenAI TTS request failed");
                Error::Synthesis(ServiceFailure::transport(&e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "OpenAI TTS error");
            return Err(Error::Synthesis(ServiceFailure::status(
                status,
                format!("OpenAI TTS error {status}: {body}"),
            )));
        }

        let audio = response.bytes().await.map_err(|e| {
            tracing::error!(error = %e, "failed to read synthesis response");
            Error::Synthesis(ServiceFailure::transport(&e))
        })?;

        tracing::info!(bytes = audio.len(), "synthesis complete");
        Ok(audio.to_vec())
    }
}

#[async_trait]
impl SpeechSynthesizer for TextToSpeech {
    async fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>> {
        if text.trim().is_empty() {
            return Err(Error::Synthesis(ServiceFailure::new(
                FailureKind::UnsupportedInput,
                "cannot synthesize empty text",
            )));
        }

        match self.provider {
            TtsProvider::GoogleTranslate => self.synthesize_google(text, language).await,
            TtsProvider::OpenAI => self.synthesize_openai(text).await,
        }
    }
}

/// Split text into whitespace-respecting chunks of at most `max_chars`
///
/// Counts characters, not bytes, so multibyte scripts are not cut short.
/// A single token longer than the limit is split at character boundaries.
fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > max_chars {
            if current_len > 0 {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = word.chars().collect();
            for piece in chars.chunks(max_chars) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }

        let separator = usize::from(current_len > 0);
        if current_len + separator + word_len > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_stays_in_one_chunk() {
        assert_eq!(split_text("안녕하세요! 반갑습니다.", 100), vec![
            "안녕하세요! 반갑습니다."
        ]);
    }

    #[test]
    fn long_text_splits_on_whitespace() {
        let chunks = split_text("one two three four", 9);
        assert_eq!(chunks, vec!["one two", "three", "four"]);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 9);
        }
    }

    #[test]
    fn oversized_token_splits_at_char_boundaries() {
        let chunks = split_text("가나다라마바사", 3);
        assert_eq!(chunks, vec!["가나다", "라마바", "사"]);
    }

    #[test]
    fn limit_counts_chars_not_bytes() {
        // Five Hangul syllables are 15 UTF-8 bytes but must stay together.
        assert_eq!(split_text("안녕하세요", 5), vec!["안녕하세요"]);
    }

    #[test]
    fn whitespace_only_text_yields_no_chunks() {
        assert!(split_text("   ", 10).is_empty());
    }

    #[tokio::test]
    async fn empty_text_is_rejected_before_any_request() {
        let tts = TextToSpeech::new_google_translate(reqwest::Client::new());
        let err = tts.synthesize("  ", "ko").await.unwrap_err();
        match err {
            Error::Synthesis(failure) => {
                assert_eq!(failure.kind, FailureKind::UnsupportedInput);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let config = VoiceConfig {
            stt_model: "whisper-1".to_string(),
            tts_provider: "espeak".to_string(),
            tts_voice: "alloy".to_string(),
            tts_speed: 1.0,
        };
        let err =
            TextToSpeech::from_config(&config, reqwest::Client::new(), None).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
