//! Turn-taking controller: one utterance in, one spoken reply out

use std::time::Duration;

use crate::chat::{ChatModel, Responder};
use crate::persona::Persona;
use crate::voice::{SpeechSynthesizer, Transcriber};
use crate::Result;

use super::state::ConversationState;
use super::transcript::{ModelMessage, Speaker, Turn};

/// Where the controller is in the turn cycle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TurnPhase {
    #[default]
    Idle,
    AwaitingTranscription,
    AwaitingResponse,
    AwaitingSynthesis,
}

impl TurnPhase {
    /// Next phase in the turn cycle
    #[must_use]
    pub const fn advance(self) -> Self {
        match self {
            Self::Idle => Self::AwaitingTranscription,
            Self::AwaitingTranscription => Self::AwaitingResponse,
            Self::AwaitingResponse => Self::AwaitingSynthesis,
            Self::AwaitingSynthesis => Self::Idle,
        }
    }
}

/// A recorded utterance delivered by the capture layer
///
/// Carries the audio as an in-memory buffer plus the duration the capture
/// layer measured. A zero duration means the capture widget is empty, not
/// that a recording failed.
#[derive(Clone, Debug)]
pub struct Utterance {
    audio: Vec<u8>,
    duration: Duration,
}

impl Utterance {
    #[must_use]
    pub const fn new(audio: Vec<u8>, duration: Duration) -> Self {
        Self { audio, duration }
    }

    #[must_use]
    pub fn audio(&self) -> &[u8] {
        &self.audio
    }

    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }

    /// Whether this is an empty-capture report rather than a recording
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.duration.is_zero()
    }
}

/// A completed exchange: both turns plus the spoken reply
#[derive(Clone, Debug)]
pub struct Exchange {
    pub user: Turn,
    pub assistant: Turn,
    /// Encoded reply audio (MP3) for client-side playback
    pub reply_audio: Vec<u8>,
}

/// Drives the turn-taking cycle for one conversation
///
/// Owns the conversation state and sequences each utterance through
/// transcription, response, and synthesis. The collaborators are injected,
/// so the cycle runs the same against HTTP providers or test doubles.
/// Exclusive access (`&mut self`, or the session lock above it) guarantees
/// at most one active turn per conversation.
pub struct ConversationController<T, R, S> {
    state: ConversationState,
    phase: TurnPhase,
    transcriber: T,
    responder: R,
    synthesizer: S,
    model: ChatModel,
    language: String,
}

impl<T, R, S> ConversationController<T, R, S>
where
    T: Transcriber,
    R: Responder,
    S: SpeechSynthesizer,
{
    /// Create a controller seeded with the persona preamble
    #[must_use]
    pub fn new(
        transcriber: T,
        responder: R,
        synthesizer: S,
        persona: &Persona,
        model: ChatModel,
    ) -> Self {
        Self {
            state: ConversationState::new(persona.system_prompt.clone()),
            phase: TurnPhase::Idle,
            transcriber,
            responder,
            synthesizer,
            model,
            language: persona.language.clone(),
        }
    }

    /// Ingest one recorded utterance
    ///
    /// Runs a full turn (transcribe, respond, synthesize) and returns the
    /// completed exchange. Returns `Ok(None)` without touching any state
    /// when the utterance is an empty-capture report or a reset is pending.
    /// A pending reset is cleared only by an empty-capture report, which is
    /// how the capture layer signals its widget was actually cleared.
    ///
    /// # Errors
    ///
    /// Returns the failing service's error. The conversation is left
    /// exactly as it was before the turn began.
    pub async fn ingest_utterance(&mut self, utterance: &Utterance) -> Result<Option<Exchange>> {
        if self.state.reset_pending() {
            if utterance.is_empty() {
                self.state.clear_reset();
                tracing::debug!("reset suppression window closed");
            } else {
                tracing::debug!(
                    duration_secs = utterance.duration().as_secs_f64(),
                    "utterance ignored while reset pending"
                );
            }
            return Ok(None);
        }

        if utterance.is_empty() {
            return Ok(None);
        }

        debug_assert_eq!(self.phase, TurnPhase::Idle);
        tracing::debug!(
            audio_bytes = utterance.audio().len(),
            duration_secs = utterance.duration().as_secs_f64(),
            "turn started"
        );

        let result = self.run_turn(utterance).await;
        // Success or failure, the cycle ends back at Idle.
        self.phase = TurnPhase::Idle;
        result.map(Some)
    }

    /// Run the three stages of a turn
    ///
    /// Nothing is recorded until every stage has succeeded, so a failed
    /// turn leaves the conversation untouched.
    async fn run_turn(&mut self, utterance: &Utterance) -> Result<Exchange> {
        self.phase = self.phase.advance();
        let text = self.transcriber.transcribe(utterance.audio()).await?;
        let user_turn = Turn::now(Speaker::User, text);

        self.phase = self.phase.advance();
        let mut request = self.state.model_history().to_vec();
        request.push(ModelMessage::user(user_turn.text.clone()));
        let reply = self.responder.respond(&request, self.model).await?;
        let reply_turn = Turn::now(Speaker::Assistant, reply);

        self.phase = self.phase.advance();
        let reply_audio = self
            .synthesizer
            .synthesize(&reply_turn.text, &self.language)
            .await?;

        self.state
            .commit_exchange(user_turn.clone(), reply_turn.clone());
        tracing::info!(
            turns = self.state.transcript().len(),
            reply_bytes = reply_audio.len(),
            "turn completed"
        );

        Ok(Exchange {
            user: user_turn,
            assistant: reply_turn,
            reply_audio,
        })
    }

    /// Reset the conversation to its initial state
    ///
    /// Idempotent. Opens the suppression window so a stale recording still
    /// sitting in the capture layer cannot restart the conversation.
    pub fn reset(&mut self) {
        self.state.reset();
        tracing::info!("conversation reset");
    }

    /// Read-only projection of the transcript for presentation
    #[must_use]
    pub fn render(&self) -> &[Turn] {
        self.state.transcript()
    }

    /// The history as the chat model sees it
    #[must_use]
    pub fn model_history(&self) -> &[ModelMessage] {
        self.state.model_history()
    }

    /// Current phase of the turn cycle
    #[must_use]
    pub const fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// The model tier used for responses
    #[must_use]
    pub const fn model(&self) -> ChatModel {
        self.model
    }

    /// Switch the response model tier; sticks until switched again
    pub fn set_model(&mut self, model: ChatModel) {
        if self.model != model {
            tracing::debug!(model = %model, "chat model switched");
            self.model = model;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_cycle_returns_to_idle() {
        let mut phase = TurnPhase::Idle;
        let expected = [
            TurnPhase::AwaitingTranscription,
            TurnPhase::AwaitingResponse,
            TurnPhase::AwaitingSynthesis,
            TurnPhase::Idle,
        ];
        for want in expected {
            phase = phase.advance();
            assert_eq!(phase, want);
        }
    }

    #[test]
    fn zero_duration_utterance_is_empty() {
        assert!(Utterance::new(vec![1, 2, 3], Duration::ZERO).is_empty());
        assert!(!Utterance::new(vec![1, 2, 3], Duration::from_millis(2300)).is_empty());
    }
}
