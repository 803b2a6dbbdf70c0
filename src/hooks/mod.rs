//! Hooks Module
//!
//! The host's event bus. Extensions attach handlers to host events; the
//! host emits an event with a mutable payload and continues once every
//! handler has returned.
//!
//! # Example
//!
//! ```ignore
//! use promptdeck::hooks::{HookEvent, HookRegistry};
//! use promptdeck::conversation::{ChatCompletionPayload, Message};
//!
//! let mut hooks = HookRegistry::new();
//! hooks.add(HookEvent::ChatCompletionPromptReady, "footer", |payload| {
//!     payload.chat.push(Message::system("Keep replies short."));
//!     Ok(())
//! });
//!
//! let mut payload = ChatCompletionPayload::new(vec![Message::user("Hi")]);
//! hooks.emit(HookEvent::ChatCompletionPromptReady, &mut payload);
//! ```
//!
//! **Important:** a handler that returns `Err` or panics is logged and
//! skipped. Dispatch never fails, so an extension cannot block the
//! request it is decorating.

mod registry;
mod types;

pub use registry::HookRegistry;
pub use types::{DispatchSummary, Hook, HookEvent};
