//! State machine module
//!
//! Contains the FSM for the widget panel's visibility.

mod events;
mod states;
mod transitions;

pub use events::WidgetEvent;
pub use states::Visibility;
pub use transitions::{StateTransition, VisibilityMachine};
