//! Hook event types

use std::fmt;

use crate::conversation::ChatCompletionPayload;

/// Host events an extension can attach to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum HookEvent {
    /// The chat-completion payload is assembled and about to be sent
    ChatCompletionPromptReady,
}

impl HookEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            HookEvent::ChatCompletionPromptReady => "chat_completion_prompt_ready",
        }
    }
}

impl fmt::Display for HookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A hook handler
///
/// Runs synchronously inside the host's dispatch and may mutate the
/// payload in place. Returning `Err` never aborts dispatch.
pub type Hook = Box<dyn Fn(&mut ChatCompletionPayload) -> anyhow::Result<()> + Send + Sync>;

/// Outcome of one dispatch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Handlers that ran to completion
    pub succeeded: usize,
    /// Handlers that returned an error or panicked
    pub failed: usize,
}
