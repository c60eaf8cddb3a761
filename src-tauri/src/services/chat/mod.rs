//! Chat-completions client for the pet's conversation.
//!
//! One request per user message, the whole linear history as payload, no
//! streaming and no retries. Failures come back as a user-facing string.

mod client;
pub(crate) mod service;
mod types;

pub use client::{
    ChatClient, CHAT_TIMEOUT, MSG_AUTH_FAILED, MSG_MISSING_KEY, MSG_MISSING_URL,
    MSG_REQUEST_FAILED,
};
pub use service::{chat_clear_history, ChatService};
pub use types::{ChatMessage, ROLE_ASSISTANT, ROLE_USER};
