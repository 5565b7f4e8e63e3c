//! View snapshot - What a renderer must put on screen
//!
//! The snapshot is plain data derived from config, session flags and the
//! message store. Renderers draw it and never reach into the session.

use serde::Serialize;
use widget_core::{Message, PreChatField, QuickPrompt, WidgetConfig};
use widget_state::{should_gate, PreChatAnswers, SessionState};

/// Quick prompts stay on offer until the conversation has moved past the
/// greeting and one more turn.
const QUICK_PROMPT_MESSAGE_LIMIT: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WidgetView {
    /// Accent color for the launcher and the visitor's bubbles.
    pub accent_color: String,
    /// The chat panel, when open.
    pub panel: Option<PanelView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelView {
    pub header: HeaderView,
    /// Absent while minimized.
    pub body: Option<PanelBody>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeaderView {
    pub title: String,
    pub logo_url: Option<String>,
    pub minimized: bool,
    /// Escalation is offered once the form is out of the way, until it has
    /// been used once.
    pub show_escalate: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PanelBody {
    PreChatForm(FormView),
    Conversation(ConversationView),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormView {
    pub message: String,
    pub fields: Vec<PreChatField>,
    pub answers: PreChatAnswers,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationView {
    pub messages: Vec<Message>,
    /// Loader text while a reply is pending.
    pub typing: Option<String>,
    pub quick_prompts: Vec<QuickPrompt>,
}

impl WidgetView {
    pub fn project(
        config: &WidgetConfig,
        state: &SessionState,
        messages: &[Message],
        answers: &PreChatAnswers,
    ) -> Self {
        let panel = state.is_open().then(|| {
            let gated = should_gate(config, state.is_form_submitted());
            let header = HeaderView {
                title: config.title.clone(),
                logo_url: config.logo_url.clone(),
                minimized: state.is_minimized(),
                show_escalate: config.agent_escalation_enabled && !state.is_escalated() && !gated,
            };
            let body = state
                .visibility()
                .shows_body()
                .then(|| Self::body(config, state, messages, answers));
            PanelView { header, body }
        });

        Self {
            accent_color: config.widget_color.clone(),
            panel,
        }
    }

    fn body(
        config: &WidgetConfig,
        state: &SessionState,
        messages: &[Message],
        answers: &PreChatAnswers,
    ) -> PanelBody {
        if should_gate(config, state.is_form_submitted()) {
            return PanelBody::PreChatForm(FormView {
                message: config.pre_chat_form.pre_chat_message.clone(),
                fields: config.pre_chat_form.active_fields().cloned().collect(),
                answers: answers.clone(),
            });
        }

        let quick_prompts = if messages.len() <= QUICK_PROMPT_MESSAGE_LIMIT {
            config.quick_prompts.clone()
        } else {
            Vec::new()
        };
        PanelBody::Conversation(ConversationView {
            messages: messages.to_vec(),
            typing: state.is_typing().then(|| config.loader_text.clone()),
            quick_prompts,
        })
    }

    pub fn conversation(&self) -> Option<&ConversationView> {
        match self.panel.as_ref()?.body.as_ref()? {
            PanelBody::Conversation(conversation) => Some(conversation),
            PanelBody::PreChatForm(_) => None,
        }
    }

    pub fn form(&self) -> Option<&FormView> {
        match self.panel.as_ref()?.body.as_ref()? {
            PanelBody::PreChatForm(form) => Some(form),
            PanelBody::Conversation(_) => None,
        }
    }
}
