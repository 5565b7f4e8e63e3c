//! Configuration resolver

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{info, warn};
use url::Url;
use widget_client::ChatBackend;
use widget_core::{Result, WidgetConfig, WidgetError};

/// Path segment that precedes the session token in embed URLs,
/// e.g. `https://host/chatbot-widget/<token>`.
const EMBED_PATH_SEGMENT: &str = "chatbot-widget";

/// Where a widget gets its configuration from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Passed in directly by the host page.
    Inline(WidgetConfig),
    /// Exchanged for a config by the token-validation collaborator.
    Token(String),
}

impl ConfigSource {
    /// Pull the session token out of an embed URL.
    pub fn from_embed_url(embed_url: &str) -> Result<Self> {
        let url = Url::parse(embed_url)
            .map_err(|e| WidgetError::ConfigUnavailable(format!("invalid embed URL: {e}")))?;
        let mut segments = url.path_segments().into_iter().flatten();
        let token = segments
            .by_ref()
            .find(|segment| *segment == EMBED_PATH_SEGMENT)
            .and_then(|_| segments.next())
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                WidgetError::ConfigUnavailable(format!("no session token in {embed_url}"))
            })?;
        Ok(Self::Token(token.to_string()))
    }
}

/// Resolves a `ConfigSource` once and caches the result for the session.
pub struct ConfigResolver {
    source: ConfigSource,
    backend: Arc<dyn ChatBackend>,
    resolved: OnceCell<Arc<WidgetConfig>>,
}

impl ConfigResolver {
    pub fn new(source: ConfigSource, backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            source,
            backend,
            resolved: OnceCell::new(),
        }
    }

    /// The widget's config, or `ConfigUnavailable` if the token is blank,
    /// rejected, or answered with something that is not a config.
    ///
    /// A failed resolution is not cached; a successful one is reused without
    /// another request.
    pub async fn resolve(&self) -> Result<Arc<WidgetConfig>> {
        self.resolved
            .get_or_try_init(|| async {
                match &self.source {
                    ConfigSource::Inline(config) => Ok(Arc::new(config.clone())),
                    ConfigSource::Token(token) => {
                        if token.trim().is_empty() {
                            return Err(WidgetError::ConfigUnavailable(
                                "missing session token".to_string(),
                            ));
                        }
                        let config = self.backend.validate_token(token).await.map_err(|e| {
                            warn!("Widget token validation failed: {}", e);
                            WidgetError::ConfigUnavailable(e.to_string())
                        })?;
                        info!("Widget config resolved for chatbot {}", config.id);
                        Ok(Arc::new(config))
                    }
                }
            })
            .await
            .cloned()
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.initialized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_from_embed_url() {
        let source = ConfigSource::from_embed_url("https://app.example.com/chatbot-widget/abc123?x=1").unwrap();
        assert_eq!(source, ConfigSource::Token("abc123".to_string()));
    }

    #[test]
    fn test_embed_url_without_token() {
        for url in [
            "https://app.example.com/chatbot-widget/",
            "https://app.example.com/other/abc",
            "not a url",
        ] {
            let err = ConfigSource::from_embed_url(url).unwrap_err();
            assert!(matches!(err, WidgetError::ConfigUnavailable(_)), "{url}");
        }
    }
}
