//! Conversation core: transcript state, turn-taking controller, sessions
//!
//! A conversation advances through discrete events. One recorded utterance
//! becomes at most one exchange (a user turn plus a spoken reply); the
//! controller owns the state and sequences the external services, and the
//! session registry isolates conversations per caller.

pub mod controller;
pub mod sessions;
pub mod state;
pub mod transcript;

pub use controller::{ConversationController, Exchange, TurnPhase, Utterance};
pub use sessions::{SessionRegistry, mint_session_id};
pub use state::ConversationState;
pub use transcript::{ModelMessage, ModelRole, Speaker, Turn};
