//! Owned conversation state: the visible transcript and the model history

use super::transcript::{ModelMessage, ModelRole, Speaker, Turn};

/// Conversation state for one session
///
/// Holds the user-visible transcript and the exact message history sent to
/// the chat model. The two grow in lockstep: every completed exchange adds
/// two turns and two history entries, so `transcript.len()` always equals
/// `model_history.len() - 1` (the preamble has no visible counterpart).
#[derive(Clone, Debug)]
pub struct ConversationState {
    preamble: ModelMessage,
    transcript: Vec<Turn>,
    model_history: Vec<ModelMessage>,
    reset_pending: bool,
}

impl ConversationState {
    /// Create a state seeded with the persona preamble
    #[must_use]
    pub fn new(preamble: impl Into<String>) -> Self {
        let preamble = ModelMessage::system(preamble);
        Self {
            transcript: Vec::new(),
            model_history: vec![preamble.clone()],
            preamble,
            reset_pending: false,
        }
    }

    /// The visible transcript
    #[must_use]
    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    /// The history as sent to the chat model, preamble included
    #[must_use]
    pub fn model_history(&self) -> &[ModelMessage] {
        &self.model_history
    }

    /// Whether a reset is awaiting a fresh capture report
    #[must_use]
    pub const fn reset_pending(&self) -> bool {
        self.reset_pending
    }

    /// Close the reset suppression window
    pub(crate) fn clear_reset(&mut self) {
        self.reset_pending = false;
    }

    /// Record one completed exchange
    ///
    /// Both turns and both history entries land together, so a
    /// half-finished exchange can never be observed.
    pub(crate) fn commit_exchange(&mut self, user_turn: Turn, reply_turn: Turn) {
        debug_assert_eq!(user_turn.speaker, Speaker::User);
        debug_assert_eq!(reply_turn.speaker, Speaker::Assistant);

        self.model_history
            .push(ModelMessage::user(user_turn.text.clone()));
        // TODO: confirm with the product owner whether replies should carry
        // the assistant role here. The shipped prompt shape has always
        // recorded them as system, and the model's behavior depends on the
        // history it sees, so this is kept as-is rather than corrected.
        self.model_history.push(ModelMessage {
            role: ModelRole::System,
            content: reply_turn.text.clone(),
        });
        self.transcript.push(user_turn);
        self.transcript.push(reply_turn);
    }

    /// Drop the conversation and open the reset suppression window
    ///
    /// Idempotent: calling twice is the same as calling once.
    pub fn reset(&mut self) {
        self.transcript.clear();
        self.model_history.clear();
        self.model_history.push(self.preamble.clone());
        self.reset_pending = true;
    }
}
