//! Widget session - One mounted widget and everything it owns

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use widget_client::{ChatBackend, ChatRequest, ChatResponse, EscalateRequest, EscalateResponse};
use widget_core::{
    replies, AudioClip, Author, Message, QuickPrompt, Result, WidgetConfig, WidgetError,
    WidgetSettings,
};
use widget_state::{
    gate, should_gate, MessageStore, PreChatAnswers, SessionState, StateTransition, Visibility,
    WidgetEvent,
};

use crate::lifecycle::TeardownReason;
use crate::resolver::{ConfigResolver, ConfigSource};
use crate::view::WidgetView;

/// Everything mutated by visitor actions and network completions.
#[derive(Debug, Default)]
struct Shared {
    state: SessionState,
    store: MessageStore,
    answers: PreChatAnswers,
}

struct Inner {
    config: Arc<WidgetConfig>,
    backend: Arc<dyn ChatBackend>,
    shared: Mutex<Shared>,
    /// Set by the first teardown, whatever triggered it.
    torn_down: AtomicBool,
}

/// Handle to a mounted widget.
///
/// Visitor actions are synchronous: they update state and return at once.
/// Collaborator calls run on detached tokio tasks whose handles are returned
/// for callers that want to wait. There is no cancellation; replies that land
/// after a close or teardown are still appended.
///
/// Must be created inside a tokio runtime. Dropping a session that was never
/// torn down counts as an unmount: teardown is spawned on the current runtime,
/// if there still is one.
pub struct WidgetSession {
    inner: Arc<Inner>,
    timeout_task: Mutex<Option<JoinHandle<()>>>,
}

impl WidgetSession {
    /// Resolve the config and mount. On `ConfigUnavailable` nothing should be
    /// rendered at all.
    pub async fn mount(
        source: ConfigSource,
        backend: Arc<dyn ChatBackend>,
        settings: &WidgetSettings,
    ) -> Result<Self> {
        let resolver = ConfigResolver::new(source, Arc::clone(&backend));
        let config = resolver.resolve().await?;
        Ok(Self::new(config, backend, settings.session_timeout()))
    }

    /// Mount with an already resolved config. The session is torn down once
    /// `session_timeout` has elapsed, whatever the visitor does.
    pub fn new(
        config: Arc<WidgetConfig>,
        backend: Arc<dyn ChatBackend>,
        session_timeout: Duration,
    ) -> Self {
        let inner = Arc::new(Inner {
            config,
            backend,
            shared: Mutex::new(Shared::default()),
            torn_down: AtomicBool::new(false),
        });
        let timeout_task = Self::spawn_timeout(Arc::downgrade(&inner), session_timeout);
        info!(
            "Widget session mounted for chatbot {} (timeout {:?})",
            inner.config.id, session_timeout
        );
        Self {
            inner,
            timeout_task: Mutex::new(Some(timeout_task)),
        }
    }

    fn spawn_timeout(inner: Weak<Inner>, session_timeout: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            tokio::time::sleep(session_timeout).await;
            if let Some(inner) = inner.upgrade() {
                inner.teardown(TeardownReason::SessionTimeout).await;
            }
        })
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.inner.config
    }

    // ========== Visibility ==========

    pub fn open(&self) -> StateTransition {
        self.handle_event(WidgetEvent::OpenRequested)
    }

    pub fn close(&self) -> StateTransition {
        self.handle_event(WidgetEvent::CloseRequested)
    }

    /// The floating launcher button: opens when closed, closes otherwise.
    pub fn toggle(&self) -> StateTransition {
        self.handle_event(WidgetEvent::LauncherClicked)
    }

    pub fn toggle_minimize(&self) -> StateTransition {
        self.handle_event(WidgetEvent::MinimizeToggled)
    }

    fn handle_event(&self, event: WidgetEvent) -> StateTransition {
        let mut shared = self.inner.shared.lock();
        let transition = shared.state.handle_event(event);
        if transition.opened() && shared.store.is_empty() {
            let greeting = self.inner.config.welcome_tagline.clone();
            shared.store.append(Author::Bot, greeting);
        }
        transition
    }

    pub fn visibility(&self) -> Visibility {
        self.inner.shared.lock().state.visibility()
    }

    // ========== Pre-chat gate ==========

    pub fn is_gated(&self) -> bool {
        let shared = self.inner.shared.lock();
        self.inner.is_gated(&shared)
    }

    /// Record one answer. Ignored once the gate is closed.
    pub fn set_answer(&self, field_id: impl Into<String>, value: impl Into<String>) {
        let mut shared = self.inner.shared.lock();
        if self.inner.is_gated(&shared) {
            shared.answers.insert(field_id.into(), value.into());
        }
    }

    pub fn answers(&self) -> PreChatAnswers {
        self.inner.shared.lock().answers.clone()
    }

    /// Replace the draft answers and submit them.
    pub fn submit_answers(&self, answers: PreChatAnswers) -> Result<()> {
        {
            let mut shared = self.inner.shared.lock();
            if self.inner.is_gated(&shared) {
                shared.answers = answers;
            }
        }
        self.submit_pre_chat_form()
    }

    /// Validate the draft answers. On success the gate closes for the rest
    /// of the session and the thank-you turn is appended; on failure nothing
    /// changes. A no-op when the form is disabled or already submitted.
    pub fn submit_pre_chat_form(&self) -> Result<()> {
        let mut shared = self.inner.shared.lock();
        if !self.inner.is_gated(&shared) {
            return Ok(());
        }

        if let Err(e) = gate::submit(&shared.answers, &self.inner.config.pre_chat_form.fields) {
            debug!("Pre-chat form rejected: {}", e);
            return Err(e.into());
        }

        shared.state.mark_form_submitted();
        shared.answers.clear();
        shared.store.append(Author::Bot, replies::PRE_CHAT_THANKS);
        info!("Pre-chat form submitted");
        Ok(())
    }

    // ========== Dispatch ==========

    /// Append the visitor turn and ask the chat collaborator for a reply.
    pub fn send(&self, text: impl Into<String>) -> Result<JoinHandle<()>> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(WidgetError::EmptyMessage);
        }
        {
            let mut shared = self.inner.shared.lock();
            if self.inner.is_gated(&shared) {
                return Err(WidgetError::Gated);
            }
            shared.store.append(Author::Visitor, text.clone());
            shared.state.begin_request();
        }
        let inner = Arc::clone(&self.inner);
        Ok(tokio::spawn(inner.deliver(text)))
    }

    pub fn send_quick_prompt(&self, prompt: &QuickPrompt) -> Result<JoinHandle<()>> {
        self.send(prompt.query.clone())
    }

    /// Transcribe a recorded clip, then send the text as a visitor turn.
    pub fn send_audio(&self, clip: AudioClip) -> Result<JoinHandle<()>> {
        {
            let mut shared = self.inner.shared.lock();
            if self.inner.is_gated(&shared) {
                return Err(WidgetError::Gated);
            }
            shared.state.begin_request();
        }
        let inner = Arc::clone(&self.inner);
        Ok(tokio::spawn(inner.transcribe_and_deliver(clip)))
    }

    // ========== Escalation ==========

    /// Hand the conversation to a human agent. Every call notifies the
    /// collaborator again and appends its own bot turn.
    pub fn escalate(&self) -> Result<JoinHandle<()>> {
        if !self.inner.config.agent_escalation_enabled {
            return Err(WidgetError::EscalationDisabled);
        }
        {
            let mut shared = self.inner.shared.lock();
            if self.inner.is_gated(&shared) {
                return Err(WidgetError::Gated);
            }
            if shared.state.mark_escalated() {
                info!("Conversation escalated to a human agent");
            }
            shared.state.begin_request();
        }
        let inner = Arc::clone(&self.inner);
        Ok(tokio::spawn(inner.request_agent()))
    }

    pub fn is_escalated(&self) -> bool {
        self.inner.shared.lock().state.is_escalated()
    }

    // ========== Lifecycle ==========

    /// The hosting page is unloading.
    pub async fn page_unload(&self) {
        self.stop_timeout();
        self.inner.teardown(TeardownReason::PageUnload).await;
    }

    /// The widget is being removed.
    pub async fn unmount(self) {
        self.stop_timeout();
        self.inner.teardown(TeardownReason::Unmount).await;
    }

    fn stop_timeout(&self) {
        if let Some(task) = self.timeout_task.lock().take() {
            task.abort();
        }
    }

    // ========== Reads ==========

    pub fn messages(&self) -> Vec<Message> {
        self.inner.shared.lock().store.all().to_vec()
    }

    pub fn is_typing(&self) -> bool {
        self.inner.shared.lock().state.is_typing()
    }

    pub fn is_form_submitted(&self) -> bool {
        self.inner.shared.lock().state.is_form_submitted()
    }

    pub fn view(&self) -> WidgetView {
        let shared = self.inner.shared.lock();
        WidgetView::project(
            &self.inner.config,
            &shared.state,
            shared.store.all(),
            &shared.answers,
        )
    }
}

impl Drop for WidgetSession {
    fn drop(&mut self) {
        self.stop_timeout();
        if self.inner.torn_down.load(Ordering::SeqCst) {
            return;
        }
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let inner = Arc::clone(&self.inner);
                runtime.spawn(async move { inner.teardown(TeardownReason::Unmount).await });
            }
            Err(_) => warn!("Widget session dropped outside a runtime; session token left valid"),
        }
    }
}

impl Inner {
    fn is_gated(&self, shared: &Shared) -> bool {
        should_gate(&self.config, shared.state.is_form_submitted())
    }

    fn finish_request(&self, reply: impl Into<String>) {
        let mut shared = self.shared.lock();
        shared.store.append(Author::Bot, reply);
        shared.state.end_request();
    }

    async fn deliver(self: Arc<Self>, text: String) {
        let request = ChatRequest {
            message: text,
            chatbot_id: self.config.id.clone(),
        };
        let reply = match self.backend.chat(request).await {
            Ok(ChatResponse {
                answer: Some(answer),
            }) if !answer.trim().is_empty() => answer,
            Ok(_) => {
                warn!("Chat reply had no answer");
                replies::CHAT_FALLBACK.to_string()
            }
            Err(e) => {
                error!("{}", WidgetError::SendFailed(e.to_string()));
                replies::CHAT_CONNECTION_ERROR.to_string()
            }
        };
        self.finish_request(reply);
    }

    async fn transcribe_and_deliver(self: Arc<Self>, clip: AudioClip) {
        let failure = match self.backend.transcribe(clip).await {
            Ok(transcription) if !transcription.text.trim().is_empty() => {
                self.shared
                    .lock()
                    .store
                    .append(Author::Visitor, transcription.text.clone());
                // The request slot taken for the upload carries on into the chat call.
                self.deliver(transcription.text).await;
                return;
            }
            Ok(_) => WidgetError::TranscriptionFailed("empty transcription".to_string()),
            Err(e) => WidgetError::TranscriptionFailed(e.to_string()),
        };
        warn!("{}", failure);
        self.finish_request(replies::TRANSCRIPTION_ERROR);
    }

    async fn request_agent(self: Arc<Self>) {
        let request = EscalateRequest {
            chatbot_id: self.config.id.clone(),
        };
        let reply = match self.backend.escalate(request).await {
            Ok(EscalateResponse {
                message: Some(message),
            }) if !message.trim().is_empty() => message,
            Ok(_) => replies::ESCALATION_FALLBACK.to_string(),
            Err(e) => {
                error!("{}", WidgetError::EscalationFailed(e.to_string()));
                replies::ESCALATION_ERROR.to_string()
            }
        };
        self.finish_request(reply);
    }

    /// Clear the conversation, then invalidate the session token.
    ///
    /// The local reset never waits on, or depends on, the deletion call.
    async fn teardown(&self, reason: TeardownReason) {
        self.torn_down.store(true, Ordering::SeqCst);
        let cleared = {
            let mut shared = self.shared.lock();
            let cleared = shared.store.len();
            shared.store.clear();
            shared.answers.clear();
            cleared
        };
        info!("Tearing down widget session on {} ({} messages cleared)", reason, cleared);

        if let Err(e) = self.backend.delete_session_token().await {
            warn!("{}", WidgetError::TeardownFailed(e.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mockall::mock;
    use widget_client::{ClientError, TranscriptionResponse};
    use widget_core::{PreChatField, PreChatForm};

    mock! {
        Backend {}

        #[async_trait]
        impl ChatBackend for Backend {
            async fn validate_token(&self, token: &str) -> widget_client::Result<WidgetConfig>;
            async fn chat(&self, request: ChatRequest) -> widget_client::Result<ChatResponse>;
            async fn escalate(&self, request: EscalateRequest) -> widget_client::Result<EscalateResponse>;
            async fn transcribe(&self, clip: AudioClip) -> widget_client::Result<TranscriptionResponse>;
            async fn delete_session_token(&self) -> widget_client::Result<()>;
        }
    }

    fn backend(delete_succeeds: bool) -> Arc<dyn ChatBackend> {
        let mut mock = MockBackend::new();
        mock.expect_delete_session_token().times(1).returning(move || {
            if delete_succeeds {
                Ok(())
            } else {
                Err(ClientError::Status {
                    status: 500,
                    body: String::new(),
                })
            }
        });
        Arc::new(mock)
    }

    fn gated_config() -> Arc<WidgetConfig> {
        Arc::new(WidgetConfig::new(1u64).with_pre_chat_form(PreChatForm::enabled(vec![
            PreChatField::new("name").required(),
            PreChatField::new("email").required(),
        ])))
    }

    #[tokio::test]
    async fn test_unmount_clears_store_and_answers() {
        for delete_succeeds in [true, false] {
            let session = WidgetSession::new(
                gated_config(),
                backend(delete_succeeds),
                Duration::from_secs(1800),
            );
            session.open();
            session.set_answer("name", "Ann");
            let inner = Arc::clone(&session.inner);
            assert_eq!(inner.shared.lock().store.len(), 1);

            session.unmount().await;

            let shared = inner.shared.lock();
            assert!(shared.store.is_empty(), "delete_succeeds={delete_succeeds}");
            assert!(shared.answers.is_empty());
            assert!(inner.torn_down.load(Ordering::SeqCst));
        }
    }

    #[tokio::test]
    async fn test_drop_after_teardown_does_not_tear_down_again() {
        let session = WidgetSession::new(
            Arc::new(WidgetConfig::new(1u64)),
            backend(true),
            Duration::from_secs(1800),
        );
        let inner = Arc::clone(&session.inner);

        session.page_unload().await;
        drop(session);
        tokio::task::yield_now().await;

        // Only the test's handle is left; no teardown task holds one.
        assert_eq!(Arc::strong_count(&inner), 1);
    }
}
