//! Scripted chat collaborator shared by the session tests

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::oneshot;
use widget_client::{
    ChatBackend, ChatRequest, ChatResponse, ClientError, EscalateRequest, EscalateResponse,
    Result, TranscriptionResponse,
};
use widget_core::{AudioClip, Author, Message, WidgetConfig};
use widget_session::WidgetSession;

pub const LONG_TIMEOUT: Duration = Duration::from_secs(1800);

enum ChatReply {
    Ready(Result<ChatResponse>),
    Pending(oneshot::Receiver<Result<ChatResponse>>),
}

/// In-memory collaborator. Chat replies are scripted per message text;
/// unscripted messages get no answer.
#[derive(Default)]
pub struct FakeBackend {
    config: Mutex<Option<WidgetConfig>>,
    chat_replies: Mutex<HashMap<String, ChatReply>>,
    escalations: Mutex<VecDeque<Result<EscalateResponse>>>,
    transcriptions: Mutex<VecDeque<Result<TranscriptionResponse>>>,
    delete_fails: Mutex<bool>,
    pub chat_requests: Mutex<Vec<ChatRequest>>,
    pub validate_calls: AtomicUsize,
    pub escalate_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
}

pub fn http_error(status: u16) -> ClientError {
    ClientError::Status {
        status,
        body: "collaborator failure".to_string(),
    }
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn serve_config(&self, config: WidgetConfig) {
        *self.config.lock() = Some(config);
    }

    pub fn answer(&self, message: &str, answer: &str) {
        self.chat_replies.lock().insert(
            message.to_string(),
            ChatReply::Ready(Ok(ChatResponse {
                answer: Some(answer.to_string()),
            })),
        );
    }

    pub fn fail_chat(&self, message: &str) {
        self.chat_replies
            .lock()
            .insert(message.to_string(), ChatReply::Ready(Err(http_error(500))));
    }

    /// Hold the reply to `message` until the returned sender fires.
    pub fn hold_chat(&self, message: &str) -> oneshot::Sender<Result<ChatResponse>> {
        let (tx, rx) = oneshot::channel();
        self.chat_replies
            .lock()
            .insert(message.to_string(), ChatReply::Pending(rx));
        tx
    }

    pub fn push_escalation(&self, reply: Result<EscalateResponse>) {
        self.escalations.lock().push_back(reply);
    }

    pub fn push_transcription(&self, reply: Result<TranscriptionResponse>) {
        self.transcriptions.lock().push_back(reply);
    }

    pub fn fail_delete(&self) {
        *self.delete_fails.lock() = true;
    }
}

#[async_trait]
impl ChatBackend for FakeBackend {
    async fn validate_token(&self, _token: &str) -> Result<WidgetConfig> {
        self.validate_calls.fetch_add(1, Ordering::SeqCst);
        self.config.lock().clone().ok_or_else(|| http_error(401))
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        self.chat_requests.lock().push(request.clone());
        let reply = self.chat_replies.lock().remove(&request.message);
        match reply {
            Some(ChatReply::Ready(reply)) => reply,
            Some(ChatReply::Pending(rx)) => rx
                .await
                .unwrap_or_else(|_| Err(ClientError::InvalidRequest("reply dropped".to_string()))),
            None => Ok(ChatResponse::default()),
        }
    }

    async fn escalate(&self, _request: EscalateRequest) -> Result<EscalateResponse> {
        self.escalate_calls.fetch_add(1, Ordering::SeqCst);
        self.escalations
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(EscalateResponse::default()))
    }

    async fn transcribe(&self, _clip: AudioClip) -> Result<TranscriptionResponse> {
        self.transcriptions
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(http_error(500)))
    }

    async fn delete_session_token(&self) -> Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if *self.delete_fails.lock() {
            return Err(http_error(500));
        }
        Ok(())
    }
}

pub fn mount(config: WidgetConfig, backend: &Arc<FakeBackend>) -> WidgetSession {
    WidgetSession::new(Arc::new(config), backend.clone(), LONG_TIMEOUT)
}

pub fn texts(messages: &[Message]) -> Vec<(Author, String)> {
    messages
        .iter()
        .map(|message| (message.author, message.text.clone()))
        .collect()
}
