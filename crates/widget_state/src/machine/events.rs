//! Widget events - Visitor actions that move the panel

use serde::{Deserialize, Serialize};

/// Events that can trigger visibility transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetEvent {
    /// Visitor opened the panel.
    OpenRequested,
    /// Visitor closed the panel from its header.
    CloseRequested,
    /// Visitor clicked the launcher button, which opens or closes.
    LauncherClicked,
    /// Visitor toggled the minimize control in the header.
    MinimizeToggled,
}
