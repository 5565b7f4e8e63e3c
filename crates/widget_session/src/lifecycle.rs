//! Teardown triggers

use std::fmt;

use serde::{Deserialize, Serialize};

/// Why a session is being torn down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeardownReason {
    /// The hosting page or tab is unloading.
    PageUnload,
    /// The widget is being removed (navigation away).
    Unmount,
    /// The session hit its hard time cap.
    SessionTimeout,
}

impl fmt::Display for TeardownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::PageUnload => "page unload",
            Self::Unmount => "unmount",
            Self::SessionTimeout => "session timeout",
        };
        f.write_str(reason)
    }
}
