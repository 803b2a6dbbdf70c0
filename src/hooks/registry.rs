//! Hook registry
//!
//! Handlers run in registration order. A failing handler is logged and
//! skipped; the remaining handlers still run and the caller always gets
//! control back.

use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};

use super::types::{DispatchSummary, Hook, HookEvent};
use crate::conversation::ChatCompletionPayload;

struct NamedHook {
    name: String,
    hook: Hook,
}

/// Event bus mapping host events to handlers
#[derive(Default)]
pub struct HookRegistry {
    hooks: HashMap<HookEvent, Vec<NamedHook>>,
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "unknown panic"
    }
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for an event
    pub fn add<F>(&mut self, event: HookEvent, name: impl Into<String>, hook: F)
    where
        F: Fn(&mut ChatCompletionPayload) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let name = name.into();
        tracing::debug!("Registering hook {} for {}", name, event);
        self.hooks.entry(event).or_default().push(NamedHook {
            name,
            hook: Box::new(hook),
        });
    }

    /// Whether a handler with this name is registered for the event
    pub fn contains(&self, event: HookEvent, name: &str) -> bool {
        self.hooks
            .get(&event)
            .is_some_and(|hooks| hooks.iter().any(|h| h.name == name))
    }

    /// Number of handlers registered for an event
    pub fn len(&self, event: HookEvent) -> usize {
        self.hooks.get(&event).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.values().all(Vec::is_empty)
    }

    /// Run every handler for `event` against the payload
    pub fn emit(&self, event: HookEvent, payload: &mut ChatCompletionPayload) -> DispatchSummary {
        let mut summary = DispatchSummary::default();
        let Some(hooks) = self.hooks.get(&event) else {
            return summary;
        };

        for named in hooks {
            match panic::catch_unwind(AssertUnwindSafe(|| (named.hook)(payload))) {
                Ok(Ok(())) => summary.succeeded += 1,
                Ok(Err(e)) => {
                    tracing::error!(hook = %named.name, "Hook failed during {}: {:?}", event, e);
                    summary.failed += 1;
                }
                Err(cause) => {
                    tracing::error!(
                        hook = %named.name,
                        "Hook panicked during {}: {}",
                        event,
                        panic_message(cause.as_ref())
                    );
                    summary.failed += 1;
                }
            }
        }

        summary
    }
}
