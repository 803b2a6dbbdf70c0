//! promptdeck
//!
//! User-authored prompts injected into a chat-completion request at a
//! chosen depth from the end of the conversation.
//!
//! - [`prompts`]: prompt records, field edits, templates and presets
//! - [`context`]: the depth-based injector
//! - [`settings`]: the host settings section and its persistence
//! - [`hooks`]: the host event bus
//! - [`extension`]: wires the injector onto the event bus

pub mod cli;
pub mod config;
pub mod context;
pub mod conversation;
pub mod core;
pub mod extension;
pub mod hooks;
pub mod logging;
pub mod prompts;
pub mod settings;

pub use config::{Config, EXTENSION_ID};
pub use context::{inject, InjectionReport};
pub use conversation::{ChatCompletionPayload, Message};
pub use crate::core::{PromptError, PromptResult};
pub use extension::PromptExtension;
pub use hooks::{HookEvent, HookRegistry};
pub use prompts::{Position, PromptId, PromptManager, PromptRecord, PromptSlot};
pub use settings::{PromptManagerSettings, SettingsStorage};
