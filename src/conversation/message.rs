//! Message types for the conversation buffer
//!
//! A message is a `{role, content}` pair. Roles are free-form strings;
//! `system`, `user` and `assistant` are the conventional ones. Messages
//! come from the host, so content may be any JSON value and unknown
//! fields are carried through untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::PromptResult;

/// A single entry in the conversation buffer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Conversational role (`system`, `user`, `assistant`, ...)
    pub role: String,
    /// Usually a string; multimodal hosts send an array of parts
    #[serde(default)]
    pub content: Value,
    /// Per-message host fields (`name`, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Message {
    /// Create a text message with an arbitrary role
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: Value::String(content.into()),
            extra: Map::new(),
        }
    }

    /// The content, when it is plain text
    pub fn text(&self) -> Option<&str> {
        self.content.as_str()
    }

    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new("assistant", content)
    }
}

/// The request payload handed to chat-completion hooks
///
/// Only `chat` is touched by this crate. Any other fields the host puts
/// in the payload are carried through unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionPayload {
    /// The conversation buffer about to be sent
    #[serde(default)]
    pub chat: Vec<Message>,
    /// Host fields this crate does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PayloadInput {
    Payload(ChatCompletionPayload),
    Messages(Vec<Message>),
}

impl ChatCompletionPayload {
    /// Wrap an existing conversation buffer
    pub fn new(chat: Vec<Message>) -> Self {
        Self {
            chat,
            extra: Map::new(),
        }
    }

    /// Parse a payload from JSON
    ///
    /// Accepts either a payload object (`{"chat": [...], ...}`) or a bare
    /// array of messages.
    pub fn from_json(json: &str) -> PromptResult<Self> {
        let input: PayloadInput = serde_json::from_str(json)?;
        Ok(match input {
            PayloadInput::Payload(payload) => payload,
            PayloadInput::Messages(chat) => Self::new(chat),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        assert_eq!(Message::system("a").role, "system");
        assert_eq!(Message::user("b").role, "user");
        assert_eq!(Message::assistant("c").role, "assistant");
        assert_eq!(Message::new("tool", "d").text(), Some("d"));
    }

    #[test]
    fn test_message_fields_round_trip() {
        let json = serde_json::json!({
            "chat": [
                {"role": "user", "content": "hi", "name": "Bob"},
                {"role": "user", "content": [{"type": "text", "text": "look"}]},
                {"role": "assistant", "content": null, "tool_calls": []}
            ]
        });
        let payload = ChatCompletionPayload::from_json(&json.to_string()).unwrap();

        assert_eq!(payload.chat[0].text(), Some("hi"));
        assert_eq!(payload.chat[0].extra.get("name"), Some(&Value::from("Bob")));
        assert_eq!(payload.chat[1].text(), None);
        assert_eq!(serde_json::to_value(&payload).unwrap(), json);
    }

    #[test]
    fn test_payload_from_bare_array() {
        let payload =
            ChatCompletionPayload::from_json(r#"[{"role":"user","content":"hi"}]"#).unwrap();
        assert_eq!(payload.chat, vec![Message::user("hi")]);
        assert!(payload.extra.is_empty());
    }

    #[test]
    fn test_payload_keeps_host_fields() {
        let json = r#"{"chat":[{"role":"system","content":"a"}],"dryRun":true}"#;
        let payload = ChatCompletionPayload::from_json(json).unwrap();
        assert_eq!(payload.chat.len(), 1);
        assert_eq!(payload.extra.get("dryRun"), Some(&Value::Bool(true)));

        let out = serde_json::to_value(&payload).unwrap();
        assert_eq!(out["dryRun"], Value::Bool(true));
    }
}
