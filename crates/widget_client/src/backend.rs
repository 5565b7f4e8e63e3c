use async_trait::async_trait;
use widget_core::{AudioClip, WidgetConfig};

use crate::error::Result;
use crate::models::{ChatRequest, ChatResponse, EscalateRequest, EscalateResponse, TranscriptionResponse};

/// The remote services a widget session talks to.
///
/// Each call is a single request: no retry, no client-side timeout.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Exchange an opaque session token for the widget's configuration.
    async fn validate_token(&self, token: &str) -> Result<WidgetConfig>;

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse>;

    async fn escalate(&self, request: EscalateRequest) -> Result<EscalateResponse>;

    async fn transcribe(&self, clip: AudioClip) -> Result<TranscriptionResponse>;

    /// Invalidate the session token. The credential travels out of band.
    async fn delete_session_token(&self) -> Result<()>;
}
