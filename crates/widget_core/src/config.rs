//! WidgetConfig - Branding, quick prompts and pre-chat form schema
//!
//! A `WidgetConfig` is either handed to the widget inline or fetched once by
//! exchanging a session token. Both the camelCase payload served by the
//! backend and the older prop names (`chatbotId`, `botName`, `primaryColor`)
//! are accepted.

use std::fmt;

use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

const DEFAULT_TITLE: &str = "Assistant";
const DEFAULT_WELCOME_TAGLINE: &str = "Hello! How can I assist you today?";
const DEFAULT_WIDGET_COLOR: &str = "#4F46E5";
const DEFAULT_LOADER_TEXT: &str = "Thinking...";
const DEFAULT_PRE_CHAT_MESSAGE: &str =
    "Please fill out this form before we start the conversation.";

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

fn default_welcome_tagline() -> String {
    DEFAULT_WELCOME_TAGLINE.to_string()
}

fn default_widget_color() -> String {
    DEFAULT_WIDGET_COLOR.to_string()
}

fn default_loader_text() -> String {
    DEFAULT_LOADER_TEXT.to_string()
}

fn default_pre_chat_message() -> String {
    DEFAULT_PRE_CHAT_MESSAGE.to_string()
}

/// Stock buttons offered when a config names none.
const DEFAULT_QUICK_PROMPTS: [(&str, &str); 4] = [
    ("Help", "How can I help you?"),
    ("Services", "Tell me more about your services"),
    ("Pricing", "I need pricing information"),
    ("Agent", "Can I speak to a human agent?"),
];

fn default_quick_prompts() -> Vec<QuickPrompt> {
    DEFAULT_QUICK_PROMPTS
        .iter()
        .map(|(title, query)| QuickPrompt::new(*title, *query))
        .collect()
}

fn default_true() -> bool {
    true
}

/// Identity of the chatbot a widget talks to.
///
/// Backends issue either numeric or string ids; the original form is kept so
/// it is echoed back unchanged in collaborator requests.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum ChatbotId {
    Numeric(u64),
    Text(String),
}

impl fmt::Display for ChatbotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}

impl From<u64> for ChatbotId {
    fn from(id: u64) -> Self {
        Self::Numeric(id)
    }
}

impl From<&str> for ChatbotId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_string())
    }
}

impl From<String> for ChatbotId {
    fn from(id: String) -> Self {
        Self::Text(id)
    }
}

/// A canned question offered as a one-click button.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct QuickPrompt {
    /// Button label.
    #[serde(alias = "label")]
    pub title: String,
    /// Text sent as the visitor turn when the prompt is picked.
    pub query: String,
}

impl QuickPrompt {
    pub fn new(title: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            query: query.into(),
        }
    }
}

/// Input kind of a pre-chat field.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    Text,
    Email,
    Tel,
    Number,
    Textarea,
    Select,
    #[serde(other)]
    Other,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

/// One field of the pre-chat form.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PreChatField {
    /// Key under which the answer is collected. Filled from the map key when
    /// the schema arrives in object-map form.
    #[serde(default)]
    pub id: String,
    #[serde(default, alias = "name")]
    pub label: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
}

impl PreChatField {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
            kind: FieldKind::Text,
            required: false,
            placeholder: None,
            enabled: true,
            options: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_kind(mut self, kind: FieldKind) -> Self {
        self.kind = kind;
        self
    }

    /// Label shown to the visitor, falling back to the field id.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }
}

/// Pre-chat form schema.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PreChatForm {
    #[serde(default)]
    pub is_enabled: bool,
    /// Ordered fields. Accepts both the array-of-objects schema and the
    /// legacy `{ "<id>": { ... } }` map, which is migrated in map order.
    #[serde(default, deserialize_with = "deserialize_fields")]
    pub fields: Vec<PreChatField>,
    #[serde(default = "default_pre_chat_message")]
    pub pre_chat_message: String,
}

impl Default for PreChatForm {
    fn default() -> Self {
        Self {
            is_enabled: false,
            fields: Vec::new(),
            pre_chat_message: default_pre_chat_message(),
        }
    }
}

impl PreChatForm {
    /// An enabled form with the given fields.
    pub fn enabled(fields: Vec<PreChatField>) -> Self {
        Self {
            is_enabled: true,
            fields,
            ..Self::default()
        }
    }

    /// Fields the visitor is asked to fill in.
    pub fn active_fields(&self) -> impl Iterator<Item = &PreChatField> {
        self.fields.iter().filter(|field| field.enabled)
    }
}

fn deserialize_fields<'de, D>(deserializer: D) -> Result<Vec<PreChatField>, D::Error>
where
    D: Deserializer<'de>,
{
    struct FieldsVisitor;

    impl<'de> Visitor<'de> for FieldsVisitor {
        type Value = Vec<PreChatField>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a list of pre-chat fields or a map of field id to field")
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: SeqAccess<'de>,
        {
            let mut fields = Vec::with_capacity(seq.size_hint().unwrap_or(0));
            while let Some(field) = seq.next_element::<PreChatField>()? {
                fields.push(field);
            }
            Ok(fields)
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut fields = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((id, mut field)) = map.next_entry::<String, PreChatField>()? {
                if field.id.is_empty() {
                    field.id = id;
                }
                fields.push(field);
            }
            Ok(fields)
        }
    }

    deserializer.deserialize_any(FieldsVisitor)
}

/// Everything the widget needs to brand itself and gate the conversation.
///
/// Immutable for the lifetime of a session.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WidgetConfig {
    #[serde(alias = "chatbotId")]
    pub id: ChatbotId,
    #[serde(default = "default_title", alias = "botName")]
    pub title: String,
    #[serde(default)]
    pub welcome_heading: Option<String>,
    #[serde(default = "default_welcome_tagline")]
    pub welcome_tagline: String,
    #[serde(default = "default_widget_color", alias = "primaryColor")]
    pub widget_color: String,
    #[serde(default)]
    pub logo_url: Option<String>,
    /// An explicit empty list turns the buttons off.
    #[serde(default = "default_quick_prompts")]
    pub quick_prompts: Vec<QuickPrompt>,
    #[serde(default, rename = "preChatForm", alias = "preChatform")]
    pub pre_chat_form: PreChatForm,
    #[serde(default = "default_loader_text")]
    pub loader_text: String,
    #[serde(default = "default_true")]
    pub agent_escalation_enabled: bool,
    #[serde(default)]
    pub user_id: Option<String>,
}

impl WidgetConfig {
    /// A config with the stock branding and no pre-chat form.
    pub fn new(id: impl Into<ChatbotId>) -> Self {
        Self {
            id: id.into(),
            title: default_title(),
            welcome_heading: None,
            welcome_tagline: default_welcome_tagline(),
            widget_color: default_widget_color(),
            logo_url: None,
            quick_prompts: default_quick_prompts(),
            pre_chat_form: PreChatForm::default(),
            loader_text: default_loader_text(),
            agent_escalation_enabled: true,
            user_id: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_quick_prompts(mut self, prompts: Vec<QuickPrompt>) -> Self {
        self.quick_prompts = prompts;
        self
    }

    pub fn with_pre_chat_form(mut self, form: PreChatForm) -> Self {
        self.pre_chat_form = form;
        self
    }

    pub fn with_agent_escalation(mut self, enabled: bool) -> Self {
        self.agent_escalation_enabled = enabled;
        self
    }

    /// Parse a config from a JSON document.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_backend_payload_with_field_array() {
        let config: WidgetConfig = serde_json::from_value(json!({
            "id": "bot-42",
            "title": "Support",
            "welcomeHeading": "Hi there",
            "welcomeTagline": "Ask me anything",
            "widgetColor": "#112233",
            "userId": "u-1",
            "preChatform": {
                "id": 7,
                "isEnabled": true,
                "chatbotId": 42,
                "preChatMessage": "Tell us about you",
                "fields": [
                    { "id": "name", "name": "Your Name", "type": "text", "enabled": true, "required": true, "placeholder": "Ann" },
                    { "id": "email", "name": "Email", "type": "email", "enabled": true, "required": false, "placeholder": "" }
                ]
            },
            "quickPrompts": [{ "title": "Help", "query": "How can you help me?" }]
        }))
        .unwrap();

        assert_eq!(config.id, ChatbotId::Text("bot-42".to_string()));
        assert_eq!(config.widget_color, "#112233");
        assert_eq!(config.loader_text, "Thinking...");
        assert!(config.agent_escalation_enabled);
        assert!(config.pre_chat_form.is_enabled);
        assert_eq!(config.pre_chat_form.pre_chat_message, "Tell us about you");
        assert_eq!(config.pre_chat_form.fields.len(), 2);
        assert_eq!(config.pre_chat_form.fields[0].display_label(), "Your Name");
        assert_eq!(config.pre_chat_form.fields[1].kind, FieldKind::Email);
        assert_eq!(config.quick_prompts[0], QuickPrompt::new("Help", "How can you help me?"));
    }

    #[test]
    fn test_legacy_field_map_is_migrated_in_order() {
        // Parsed from text so the map keeps document order.
        let config = WidgetConfig::from_json(
            r##"{
                "chatbotId": 1,
                "botName": "SmartAssist",
                "primaryColor": "#4F46E5",
                "preChatForm": {
                    "isEnabled": true,
                    "preChatMessage": "Please provide some information before we begin:",
                    "fields": {
                        "name": { "type": "text", "label": "Your Name", "required": true },
                        "email": { "type": "email", "label": "Email Address", "required": true },
                        "topic": { "type": "select", "options": [{ "value": "sales", "label": "Sales" }] }
                    }
                }
            }"##,
        )
        .unwrap();

        assert_eq!(config.id, ChatbotId::Numeric(1));
        assert_eq!(config.title, "SmartAssist");
        let ids: Vec<&str> = config
            .pre_chat_form
            .fields
            .iter()
            .map(|f| f.id.as_str())
            .collect();
        assert_eq!(ids, vec!["name", "email", "topic"]);
        assert_eq!(config.pre_chat_form.fields[2].kind, FieldKind::Select);
        assert_eq!(config.pre_chat_form.fields[2].options.len(), 1);
        assert!(!config.pre_chat_form.fields[2].required);
    }

    #[test]
    fn test_defaults_when_fields_absent() {
        let config: WidgetConfig = serde_json::from_value(json!({ "id": 3 })).unwrap();
        assert_eq!(config, WidgetConfig::new(3u64));
        assert!(!config.pre_chat_form.is_enabled);
        let titles: Vec<_> = config.quick_prompts.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["Help", "Services", "Pricing", "Agent"]);
        assert_eq!(config.quick_prompts[3].query, "Can I speak to a human agent?");
        assert_eq!(
            config.pre_chat_form.pre_chat_message,
            "Please fill out this form before we start the conversation."
        );
    }

    #[test]
    fn test_empty_quick_prompts_stay_empty() {
        let config = WidgetConfig::from_json(r#"{ "id": 3, "quickPrompts": [] }"#).unwrap();
        assert!(config.quick_prompts.is_empty());
    }

    #[test]
    fn test_missing_identity_is_rejected() {
        let result = WidgetConfig::from_json(r#"{ "title": "No id" }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_field_kind_falls_back_to_other() {
        let field: PreChatField =
            serde_json::from_value(json!({ "id": "dob", "type": "date" })).unwrap();
        assert_eq!(field.kind, FieldKind::Other);
        assert!(field.enabled);
        assert_eq!(field.display_label(), "dob");
    }

    #[test]
    fn test_chatbot_id_round_trips_in_original_form() {
        assert_eq!(serde_json::to_value(ChatbotId::from(5u64)).unwrap(), json!(5));
        assert_eq!(serde_json::to_value(ChatbotId::from("abc")).unwrap(), json!("abc"));
        assert_eq!(ChatbotId::from(5u64).to_string(), "5");
    }
}
