//! widget_core - Core types for the embeddable chat widget
//!
//! This crate provides the foundational types used across all widget crates:
//! - `config` - WidgetConfig, QuickPrompt, PreChatForm (branding and form schema)
//! - `message` - Message, Author and the fixed bot replies
//! - `audio` - AudioClip uploaded for transcription
//! - `settings` - WidgetSettings (collaborator endpoints, session timeout)
//! - `error` - WidgetError taxonomy

pub mod audio;
pub mod config;
pub mod error;
pub mod message;
pub mod settings;

// Re-export commonly used types
pub use audio::AudioClip;
pub use config::{
    ChatbotId, FieldKind, PreChatField, PreChatForm, QuickPrompt, SelectOption, WidgetConfig,
};
pub use error::{Result, ValidationError, WidgetError};
pub use message::{replies, Author, Message, MessageId};
pub use settings::{EndpointPaths, WidgetSettings};
