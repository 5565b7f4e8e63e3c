//! # Widget Session
//!
//! Drives one mounted chat widget: resolves its configuration, gates the
//! conversation behind the pre-chat form, dispatches visitor turns to the
//! chat collaborator, escalates to a human agent and tears the session down.

pub mod lifecycle;
pub mod resolver;
pub mod session;
pub mod view;

// Re-exports
pub use lifecycle::TeardownReason;
pub use resolver::{ConfigResolver, ConfigSource};
pub use session::WidgetSession;
pub use view::{ConversationView, FormView, HeaderView, PanelBody, PanelView, WidgetView};
