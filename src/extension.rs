//! Extension entry point
//!
//! Connects the stored prompt collection to the host's event bus: one
//! handler on [`HookEvent::ChatCompletionPromptReady`] that injects the
//! enabled prompts into the outgoing conversation.

use anyhow::anyhow;

use crate::config::EXTENSION_ID;
use crate::context::inject;
use crate::hooks::{HookEvent, HookRegistry};
use crate::settings::SharedSettings;

/// The prompt injection extension
#[derive(Clone)]
pub struct PromptExtension {
    settings: SharedSettings,
}

impl PromptExtension {
    pub fn new(settings: SharedSettings) -> Self {
        Self { settings }
    }

    /// Install the injection handler
    ///
    /// Registering twice on the same bus is a no-op. Returns whether a
    /// handler was added.
    pub fn register(&self, hooks: &mut HookRegistry) -> bool {
        let event = HookEvent::ChatCompletionPromptReady;
        if hooks.contains(event, EXTENSION_ID) {
            tracing::warn!(extension = EXTENSION_ID, "Injection hook already registered");
            return false;
        }

        let settings = self.settings.clone();
        hooks.add(event, EXTENSION_ID, move |payload| {
            let settings = settings
                .read()
                .map_err(|_| anyhow!("[{}] settings lock poisoned", EXTENSION_ID))?;
            let report = inject(&settings.prompts, &mut payload.chat);
            tracing::info!(
                extension = EXTENSION_ID,
                injected = report.injected,
                disabled = report.disabled,
                failed = report.failed.len(),
                "Prompt injection finished"
            );
            Ok(())
        });
        tracing::info!(extension = EXTENSION_ID, "Registered injection hook for {}", event);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::{ChatCompletionPayload, Message};
    use crate::prompts::{Position, PromptId, PromptRecord};
    use crate::settings::{new_shared_settings, PromptManagerSettings};

    fn settings_with(records: Vec<PromptRecord>) -> SharedSettings {
        let mut settings = PromptManagerSettings::default();
        settings.prompts = records.into_iter().map(Into::into).collect();
        new_shared_settings(settings)
    }

    #[test]
    fn test_register_once() {
        let extension = PromptExtension::new(settings_with(Vec::new()));
        let mut hooks = HookRegistry::new();

        assert!(extension.register(&mut hooks));
        assert!(!extension.register(&mut hooks));
        assert_eq!(hooks.len(HookEvent::ChatCompletionPromptReady), 1);
    }

    #[test]
    fn test_hook_reads_settings_at_dispatch_time() {
        let settings = settings_with(Vec::new());
        let extension = PromptExtension::new(settings.clone());
        let mut hooks = HookRegistry::new();
        extension.register(&mut hooks);

        settings.write().unwrap().prompts.push(
            PromptRecord::new(PromptId::new(1))
                .with_text("late")
                .with_position(Position::DeepAssistant)
                .into(),
        );

        let mut payload = ChatCompletionPayload::new(vec![Message::user("hi")]);
        let summary = hooks.emit(HookEvent::ChatCompletionPromptReady, &mut payload);

        assert_eq!(summary.succeeded, 1);
        assert_eq!(
            payload.chat,
            vec![Message::user("hi"), Message::assistant("late")]
        );
    }
}
