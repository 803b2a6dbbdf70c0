//! Conversation buffer types
//!
//! The host owns the conversation; this crate only sees it for the
//! duration of one chat-completion event.

mod message;

pub use message::{ChatCompletionPayload, Message};
