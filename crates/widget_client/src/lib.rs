pub mod backend;
pub mod client;
pub mod error;
pub mod models;

pub use backend::ChatBackend;
pub use client::HttpChatBackend;
pub use error::{ClientError, Result};
pub use models::{ChatRequest, ChatResponse, EscalateRequest, EscalateResponse, TranscriptionResponse};
