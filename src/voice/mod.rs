//! Voice processing module
//!
//! Speech-to-text and text-to-speech provider clients. Audio capture and
//! playback live in the browser; this side only sees encoded bytes.

pub mod stt;
pub mod tts;

pub use stt::{Transcriber, WhisperTranscriber};
pub use tts::{SpeechSynthesizer, TextToSpeech};
