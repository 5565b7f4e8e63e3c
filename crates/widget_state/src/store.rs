//! Message store - The ordered conversation

use widget_core::{Author, Message, MessageId};

/// Append-only sequence of chat turns.
///
/// Owns id generation so ids stay unique however appends interleave.
/// Ids keep counting across `clear`.
#[derive(Debug, Clone)]
pub struct MessageStore {
    messages: Vec<Message>,
    next_id: MessageId,
}

impl Default for MessageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageStore {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            next_id: 1,
        }
    }

    /// Append a turn and return a copy of it.
    pub fn append(&mut self, author: Author, text: impl Into<String>) -> Message {
        let message = Message::new(self.next_id, author, text);
        self.next_id += 1;
        self.messages.push(message.clone());
        message
    }

    /// All turns in insertion order.
    pub fn all(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Drop every turn. Only teardown calls this.
    pub fn clear(&mut self) {
        self.messages.clear();
    }
}
