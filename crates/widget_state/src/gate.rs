//! Pre-chat gate - Blocks the conversation until the visitor introduces themselves

use std::collections::HashMap;

use widget_core::{PreChatField, ValidationError, WidgetConfig};

/// Answers keyed by field id.
pub type PreChatAnswers = HashMap<String, String>;

/// Whether the pre-chat form still blocks the conversation.
pub fn should_gate(config: &WidgetConfig, form_submitted: bool) -> bool {
    config.pre_chat_form.is_enabled && !form_submitted
}

/// Validate answers against the form's fields.
///
/// Fails if any enabled, required field is missing or blank. The error lists
/// every such field in schema order.
pub fn submit(answers: &PreChatAnswers, fields: &[PreChatField]) -> Result<(), ValidationError> {
    let missing: Vec<String> = fields
        .iter()
        .filter(|field| field.enabled && field.required)
        .filter(|field| {
            answers
                .get(&field.id)
                .map_or(true, |answer| answer.trim().is_empty())
        })
        .map(|field| field.id.clone())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { missing })
    }
}
