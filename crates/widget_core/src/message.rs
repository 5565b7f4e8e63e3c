//! Message - A single chat turn

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

/// Fixed bot replies used when a collaborator cannot supply one.
pub mod replies {
    /// Appended once the pre-chat form is accepted.
    pub const PRE_CHAT_THANKS: &str = "Thank you for providing your information!";
    /// Chat collaborator answered without an `answer`.
    pub const CHAT_FALLBACK: &str = "Sorry, there was an issue processing your request.";
    /// Chat collaborator could not be reached or returned a failure status.
    pub const CHAT_CONNECTION_ERROR: &str =
        "Sorry, there was an error connecting to the service. Please try again later.";
    /// Escalation collaborator answered without a `message`.
    pub const ESCALATION_FALLBACK: &str = "Your request has been escalated to a human agent.";
    /// Escalation collaborator could not be reached or returned a failure status.
    pub const ESCALATION_ERROR: &str =
        "Sorry, we couldn't reach a human agent right now. Please try again later.";
    /// Transcription collaborator could not turn the clip into text.
    pub const TRANSCRIPTION_ERROR: &str =
        "Sorry, I couldn't transcribe your audio. Please try again.";
}

/// Message identifier, monotonic within a session.
pub type MessageId = u64;

/// Who authored a turn.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    #[serde(alias = "user")]
    Visitor,
    Bot,
}

/// A chat turn. Never mutated after creation.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub text: String,
    pub author: Author,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(id: MessageId, author: Author, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            author,
            created_at: Utc::now(),
        }
    }

    pub fn is_from_visitor(&self) -> bool {
        self.author == Author::Visitor
    }

    pub fn is_from_bot(&self) -> bool {
        self.author == Author::Bot
    }

    /// Local wall-clock time shown under the bubble, e.g. `14:05`.
    pub fn display_time(&self) -> String {
        self.created_at
            .with_timezone(&Local)
            .format("%H:%M")
            .to_string()
    }
}
