use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info};
use widget_core::{AudioClip, WidgetConfig, WidgetSettings};

use crate::backend::ChatBackend;
use crate::error::{ClientError, Result};
use crate::models::{
    ChatRequest, ChatResponse, ConfigEnvelope, EscalateRequest, EscalateResponse,
    TokenValidationRequest, TranscriptionResponse,
};

const DEFAULT_USER_AGENT: &str = concat!("chat-widget/", env!("CARGO_PKG_VERSION"));

/// `ChatBackend` over HTTP.
///
/// One `reqwest::Client` with a cookie jar is shared by every call, so the
/// session cookie the backend sets travels with later requests, including
/// the token deletion on teardown.
#[derive(Debug, Clone)]
pub struct HttpChatBackend {
    client: Client,
    settings: WidgetSettings,
}

impl HttpChatBackend {
    pub fn new(settings: WidgetSettings) -> Result<Self> {
        let client = Self::build_http_client(&settings)?;
        Ok(Self { client, settings })
    }

    fn build_http_client(settings: &WidgetSettings) -> Result<Client> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let user_agent = settings.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
        let user_agent = HeaderValue::from_str(user_agent)
            .map_err(|e| ClientError::InvalidRequest(format!("invalid user agent: {e}")))?;
        headers.insert(USER_AGENT, user_agent);

        Client::builder()
            .default_headers(headers)
            .cookie_store(true)
            .build()
            .map_err(ClientError::from)
    }

    pub fn settings(&self) -> &WidgetSettings {
        &self.settings
    }

    fn url(&self, path: &str) -> String {
        self.settings.endpoint_url(path)
    }

    /// Turn a non-success status into `ClientError::Status`, keeping the body
    /// for the log.
    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ClientError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ChatBackend for HttpChatBackend {
    async fn validate_token(&self, token: &str) -> Result<WidgetConfig> {
        if token.trim().is_empty() {
            return Err(ClientError::InvalidRequest("empty session token".to_string()));
        }

        let url = self.url(&self.settings.endpoints.validate_token);
        debug!("Validating widget token at {}", url);
        let response = self
            .client
            .post(&url)
            .json(&TokenValidationRequest { token })
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        let envelope: ConfigEnvelope = Self::decode(response).await?;
        let config = envelope.into_config();
        info!("Resolved widget config for chatbot {}", config.id);
        Ok(config)
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let url = self.url(&self.settings.endpoints.chat);
        debug!("Sending chat message for chatbot {}", request.chatbot_id);
        let response = self.client.post(&url).json(&request).send().await?;
        let response = Self::check_status(response).await?;
        Self::decode(response).await
    }

    async fn escalate(&self, request: EscalateRequest) -> Result<EscalateResponse> {
        let url = self.url(&self.settings.endpoints.escalate);
        info!("Escalating chatbot {} conversation to an agent", request.chatbot_id);
        let response = self.client.post(&url).json(&request).send().await?;
        let response = Self::check_status(response).await?;
        Self::decode(response).await
    }

    async fn transcribe(&self, clip: AudioClip) -> Result<TranscriptionResponse> {
        if clip.is_empty() {
            return Err(ClientError::InvalidRequest("no audio data provided".to_string()));
        }

        let part = Part::bytes(clip.data.to_vec())
            .file_name(clip.file_name())
            .mime_str(&clip.mime_type)?;
        let form = Form::new().part("audio", part);

        let url = self.url(&self.settings.endpoints.transcribe);
        debug!("Uploading {} bytes of {} for transcription", clip.data.len(), clip.mime_type);
        let response = self.client.post(&url).multipart(form).send().await?;
        let response = Self::check_status(response).await?;
        Self::decode(response).await
    }

    async fn delete_session_token(&self) -> Result<()> {
        let url = self.url(&self.settings.endpoints.session_token);
        let response = self.client.delete(&url).send().await.map_err(|e| {
            error!("Failed to send session token deletion: {}", e);
            ClientError::from(e)
        })?;
        Self::check_status(response).await?;
        debug!("Session token deleted");
        Ok(())
    }
}
