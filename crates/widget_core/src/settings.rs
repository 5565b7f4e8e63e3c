use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Result, WidgetError};

const SETTINGS_FILE_PATH: &str = "widget.toml";
const DEFAULT_API_BASE: &str = "http://localhost:3000";
/// Hard cap on a session, counted from mount.
const DEFAULT_SESSION_TIMEOUT_SECS: u64 = 30 * 60;

/// Paths of the collaborator endpoints, relative to `api_base`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EndpointPaths {
    pub validate_token: String,
    pub chat: String,
    pub escalate: String,
    pub transcribe: String,
    pub session_token: String,
}

impl Default for EndpointPaths {
    fn default() -> Self {
        Self {
            validate_token: "/api/chatbot/validate-token".to_string(),
            chat: "/api/chatbot/chat".to_string(),
            escalate: "/api/chatbot/escalate".to_string(),
            transcribe: "/api/chatbot/transcribe".to_string(),
            session_token: "/api/chatbot/session-token".to_string(),
        }
    }
}

/// Where the widget's collaborators live and how long a session may last.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WidgetSettings {
    pub api_base: String,
    pub endpoints: EndpointPaths,
    pub session_timeout_secs: u64,
    pub user_agent: Option<String>,
}

impl Default for WidgetSettings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            endpoints: EndpointPaths::default(),
            session_timeout_secs: DEFAULT_SESSION_TIMEOUT_SECS,
            user_agent: None,
        }
    }
}

impl WidgetSettings {
    /// Defaults, then `widget.toml` in the working directory, then environment.
    pub fn load() -> Self {
        Self::load_from(Path::new(SETTINGS_FILE_PATH))
    }

    /// Defaults, then the given file if it exists and parses, then environment.
    pub fn load_from(path: &Path) -> Self {
        let mut settings = Self::default();

        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => match Self::from_toml_str(&content) {
                    Ok(file_settings) => settings = file_settings,
                    Err(e) => warn!("Ignoring settings file {}: {}", path.display(), e),
                },
                Err(e) => warn!("Failed to read settings file {}: {}", path.display(), e),
            }
        }

        settings.apply_overrides(|key| std::env::var(key).ok());
        settings
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| WidgetError::Settings(e.to_string()))
    }

    /// Apply `WIDGET_*` overrides from the given lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(api_base) = lookup("WIDGET_API_BASE") {
            if !api_base.trim().is_empty() {
                self.api_base = api_base;
            }
        }
        if let Some(timeout) = lookup("WIDGET_SESSION_TIMEOUT_SECS") {
            match timeout.trim().parse::<u64>() {
                Ok(secs) => self.session_timeout_secs = secs,
                Err(_) => warn!("Ignoring invalid WIDGET_SESSION_TIMEOUT_SECS={timeout:?}"),
            }
        }
        if let Some(user_agent) = lookup("WIDGET_USER_AGENT") {
            self.user_agent = Some(user_agent);
        }
    }

    pub fn session_timeout(&self) -> Duration {
        Duration::from_secs(self.session_timeout_secs)
    }

    /// Absolute URL for an endpoint path.
    pub fn endpoint_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_cap_session_at_thirty_minutes() {
        let settings = WidgetSettings::default();
        assert_eq!(settings.session_timeout(), Duration::from_secs(1800));
        assert_eq!(
            settings.endpoint_url(&settings.endpoints.chat),
            "http://localhost:3000/api/chatbot/chat"
        );
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let settings = WidgetSettings::from_toml_str(
            r#"
            api_base = "https://chat.example.com/"

            [endpoints]
            chat = "v2/chat"
            "#,
        )
        .unwrap();
        assert_eq!(settings.endpoint_url(&settings.endpoints.chat), "https://chat.example.com/v2/chat");
        assert_eq!(settings.endpoints.escalate, "/api/chatbot/escalate");
        assert_eq!(settings.session_timeout_secs, 1800);
    }

    #[test]
    fn invalid_toml_is_a_settings_error() {
        let err = WidgetSettings::from_toml_str("api_base = [").unwrap_err();
        assert!(matches!(err, WidgetError::Settings(_)));
    }

    #[test]
    fn env_overrides_win() {
        let mut settings = WidgetSettings::default();
        settings.apply_overrides(lookup_from(&[
            ("WIDGET_API_BASE", "http://127.0.0.1:9000"),
            ("WIDGET_SESSION_TIMEOUT_SECS", "60"),
        ]));
        assert_eq!(settings.api_base, "http://127.0.0.1:9000");
        assert_eq!(settings.session_timeout_secs, 60);
    }

    #[test]
    fn invalid_timeout_override_is_ignored() {
        let mut settings = WidgetSettings::default();
        settings.apply_overrides(lookup_from(&[("WIDGET_SESSION_TIMEOUT_SECS", "soon")]));
        assert_eq!(settings.session_timeout_secs, 1800);
    }

    #[test]
    fn load_from_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("widget.toml");
        std::fs::write(&path, "session_timeout_secs = 120\n").unwrap();

        let settings = WidgetSettings::load_from(&path);
        // Environment may override, but only if set in the test runner.
        if std::env::var("WIDGET_SESSION_TIMEOUT_SECS").is_err() {
            assert_eq!(settings.session_timeout_secs, 120);
        }
    }

    #[test]
    fn load_from_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = WidgetSettings::load_from(&dir.path().join("absent.toml"));
        if std::env::var("WIDGET_API_BASE").is_err() {
            assert_eq!(settings.api_base, "http://localhost:3000");
        }
    }
}
