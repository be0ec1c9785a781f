//! Dialogue engine — multi-turn flows collecting structured data from
//! free-text replies.
//!
//! Each flow is a variant of the `Dialogue` union carrying its own
//! step-local state; the methods here dispatch on the tag. The dispatcher
//! keeps at most one live dialogue per chat.

pub mod subscribe;

pub use subscribe::SubscribeDialogue;

use crate::subscriber::Subscriber;

/// What one dialogue step produced: an optional reply for the chat, and, on
/// the final step, the finalized subscription for the store.
#[derive(Debug, Default)]
pub struct StepResult {
    pub reply: Option<String>,
    pub finalized: Option<Subscriber>,
}

impl StepResult {
    pub fn reply(text: String) -> Self {
        Self {
            reply: Some(text),
            finalized: None,
        }
    }

    pub fn silent() -> Self {
        Self::default()
    }
}

/// A live dialogue. One variant per flow; future flows (e.g. changing the
/// alert time of an existing subscription) slot in as new variants.
#[derive(Debug)]
pub enum Dialogue {
    Subscribe(SubscribeDialogue),
}

impl Dialogue {
    /// Entry prompt, emitted once when the dialogue is created.
    pub fn on_start(&mut self) -> Option<String> {
        match self {
            Self::Subscribe(d) => d.on_start(),
        }
    }

    /// Feed one user reply into the live flow.
    pub fn on_message(&mut self, text: &str, now: i64) -> StepResult {
        match self {
            Self::Subscribe(d) => d.on_message(text, now),
        }
    }

    /// Whether the flow is finished and should be dropped from the table.
    pub fn is_ended(&self) -> bool {
        match self {
            Self::Subscribe(d) => d.is_ended(),
        }
    }
}
