//! widget_state - Interaction state for the chat widget
//!
//! This crate holds the state a widget session mutates:
//! - `machine` - closed / open / minimized visibility FSM
//! - `session` - the flag record (escalated, form submitted, typing)
//! - `gate` - pre-chat form gating and validation
//! - `store` - the append-only message store

pub mod gate;
pub mod machine;
pub mod session;
pub mod store;

// Re-export commonly used types
pub use gate::{should_gate, submit, PreChatAnswers};
pub use machine::{StateTransition, Visibility, VisibilityMachine, WidgetEvent};
pub use session::SessionState;
pub use store::MessageStore;
