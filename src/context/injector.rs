//! Depth-based prompt injection
//!
//! Enabled prompts are inserted into the conversation buffer one at a
//! time, in collection order. A prompt with depth `d` lands `d` entries
//! before the end of the buffer as it stands at that moment, so each
//! insertion shifts the reference point for the next one.

use serde_json::Value;

use crate::config::EXTENSION_ID;
use crate::conversation::Message;
use crate::core::{PromptError, PromptResult};
use crate::prompts::record::{coerce_depth, position_from_value};
use crate::prompts::{PromptId, PromptRecord, PromptSlot};

/// A prompt resolved to what actually goes into the buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Injection {
    pub role: &'static str,
    pub content: String,
    pub depth: usize,
}

/// Anything the injector can place into a conversation
pub trait InjectablePrompt {
    /// Disabled prompts are skipped without being resolved
    fn is_enabled(&self) -> bool;

    /// Resolve role, content and depth
    fn resolve(&self) -> PromptResult<Injection>;

    /// Identifier used in diagnostics, when one can be found
    fn prompt_id(&self) -> Option<PromptId> {
        None
    }
}

impl InjectablePrompt for PromptRecord {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn resolve(&self) -> PromptResult<Injection> {
        Ok(Injection {
            role: self.position.role(),
            content: self.text.clone(),
            depth: self.depth,
        })
    }

    fn prompt_id(&self) -> Option<PromptId> {
        Some(self.id)
    }
}

impl InjectablePrompt for PromptSlot {
    fn is_enabled(&self) -> bool {
        match self {
            PromptSlot::Record(record) => record.is_enabled(),
            PromptSlot::Malformed(value) => value.get("enabled").is_some_and(is_truthy),
        }
    }

    fn resolve(&self) -> PromptResult<Injection> {
        match self {
            PromptSlot::Record(record) => record.resolve(),
            PromptSlot::Malformed(value) => {
                let content = match value.get("text") {
                    Some(Value::String(text)) => text.clone(),
                    Some(other) => {
                        return Err(PromptError::MalformedRecord(format!(
                            "text must be a string, found {}",
                            json_type(other)
                        )))
                    }
                    None => {
                        return Err(PromptError::MalformedRecord("missing text".to_string()))
                    }
                };
                let position = position_from_value(value.get("position").unwrap_or(&Value::Null));
                Ok(Injection {
                    role: position.role(),
                    content,
                    depth: value.get("depth").map(coerce_depth).unwrap_or(0),
                })
            }
        }
    }

    fn prompt_id(&self) -> Option<PromptId> {
        self.id()
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A prompt that could not be injected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectionFailure {
    /// Position of the prompt in the collection
    pub index: usize,
    pub id: Option<PromptId>,
    pub reason: String,
}

/// Summary of one injection pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InjectionReport {
    pub injected: usize,
    pub disabled: usize,
    pub failed: Vec<InjectionFailure>,
}

/// Buffer index for an entry `depth` places before the end
///
/// Depth 0 appends; a depth past the start clamps to index 0.
pub fn insertion_index(len: usize, depth: usize) -> usize {
    len.saturating_sub(depth)
}

/// Inject every enabled prompt into `chat`, in collection order
///
/// Never fails: a prompt that cannot be resolved is logged, recorded in
/// the report and skipped.
pub fn inject<P: InjectablePrompt>(prompts: &[P], chat: &mut Vec<Message>) -> InjectionReport {
    let mut report = InjectionReport::default();
    if prompts.is_empty() {
        return report;
    }

    for (index, prompt) in prompts.iter().enumerate() {
        if !prompt.is_enabled() {
            report.disabled += 1;
            continue;
        }

        match prompt.resolve() {
            Ok(injection) => {
                let at = insertion_index(chat.len(), injection.depth);
                tracing::debug!(
                    extension = EXTENSION_ID,
                    index,
                    role = injection.role,
                    depth = injection.depth,
                    at,
                    "Injecting prompt"
                );
                chat.insert(at, Message::new(injection.role, injection.content));
                report.injected += 1;
            }
            Err(e) => {
                let id = prompt.prompt_id();
                tracing::error!(
                    extension = EXTENSION_ID,
                    index,
                    id = ?id,
                    "Error injecting prompt: {}",
                    e
                );
                report.failed.push(InjectionFailure {
                    index,
                    id,
                    reason: e.to_string(),
                });
            }
        }
    }

    report
}
