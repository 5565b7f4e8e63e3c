//! Widget error types

use thiserror::Error;

/// Pre-chat form validation failure.
///
/// Lists every required field id that had no usable answer, in schema order.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Missing required fields: {}", missing.join(", "))]
pub struct ValidationError {
    pub missing: Vec<String>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WidgetError {
    #[error("Widget configuration unavailable: {0}")]
    ConfigUnavailable(String),

    #[error("Message could not be delivered: {0}")]
    SendFailed(String),

    #[error("Audio transcription failed: {0}")]
    TranscriptionFailed(String),

    #[error("Escalation failed: {0}")]
    EscalationFailed(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    #[error("Session token deletion failed: {0}")]
    TeardownFailed(String),

    #[error("Conversation is gated behind the pre-chat form")]
    Gated,

    #[error("Message is empty")]
    EmptyMessage,

    #[error("Agent escalation is disabled for this widget")]
    EscalationDisabled,

    #[error("Settings error: {0}")]
    Settings(String),
}

pub type Result<T> = std::result::Result<T, WidgetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_lists_missing_fields() {
        let err = ValidationError {
            missing: vec!["name".to_string(), "email".to_string()],
        };
        assert_eq!(err.to_string(), "Missing required fields: name, email");
    }

    #[test]
    fn validation_error_converts_into_widget_error() {
        let err: WidgetError = ValidationError {
            missing: vec!["name".to_string()],
        }
        .into();
        assert!(matches!(err, WidgetError::ValidationFailed(_)));
    }
}
