//! Visibility states - Where the chat panel is on screen

use serde::{Deserialize, Serialize};

/// Visibility of the chat panel.
///
/// The floating launcher button is always shown once config resolves; this
/// only tracks the panel above it.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Only the launcher button is visible.
    #[default]
    Closed,
    /// The full panel is visible.
    Open,
    /// The panel is open but collapsed to its header.
    Minimized,
}

impl Visibility {
    /// Open or minimized.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open | Self::Minimized)
    }

    pub fn is_minimized(&self) -> bool {
        matches!(self, Self::Minimized)
    }

    /// Whether the conversation body (messages, input) is on screen.
    pub fn shows_body(&self) -> bool {
        matches!(self, Self::Open)
    }
}
