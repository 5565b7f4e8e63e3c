//! Request and response bodies exchanged with the collaborators.

use serde::{Deserialize, Serialize};
use widget_core::{ChatbotId, WidgetConfig};

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TokenValidationRequest<'a> {
    pub token: &'a str,
}

/// Token validation answers with the config itself or wraps it.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ConfigEnvelope {
    Wrapped {
        #[serde(alias = "data")]
        config: WidgetConfig,
    },
    Bare(WidgetConfig),
}

impl ConfigEnvelope {
    pub(crate) fn into_config(self) -> WidgetConfig {
        match self {
            Self::Wrapped { config } | Self::Bare(config) => config,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    pub chatbot_id: ChatbotId,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ChatResponse {
    #[serde(default)]
    pub answer: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EscalateRequest {
    pub chatbot_id: ChatbotId,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct EscalateResponse {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TranscriptionResponse {
    pub text: String,
}
