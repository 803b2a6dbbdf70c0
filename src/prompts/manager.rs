//! Prompt manager
//!
//! Owns the editing side of the extension: adding, editing and removing
//! prompts, per-prompt templates and global presets. Every mutation is
//! applied to the shared settings and then handed to the host's
//! [`SettingsSaver`] before the call returns.

use std::sync::{RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;

use super::field::{FieldValue, FormInput, PromptField};
use super::record::{IdGenerator, PromptId, PromptRecord, PromptSlot};
use crate::context::{inject, InjectionReport};
use crate::conversation::Message;
use crate::core::{PromptError, PromptResult};
use crate::settings::{
    new_shared_settings, GlobalPreset, PromptManagerSettings, SettingsSaver, SharedSettings,
};

/// Manages the stored prompt collection
pub struct PromptManager {
    settings: SharedSettings,
    saver: Box<dyn SettingsSaver>,
    ids: IdGenerator,
}

fn trimmed_name(name: &str) -> PromptResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(PromptError::EmptyName);
    }
    Ok(name.to_string())
}

fn find_record_mut(
    settings: &mut PromptManagerSettings,
    id: PromptId,
) -> PromptResult<&mut PromptRecord> {
    settings
        .prompts
        .iter_mut()
        .filter_map(PromptSlot::as_record_mut)
        .find(|record| record.id == id)
        .ok_or(PromptError::PromptNotFound(id))
}

impl PromptManager {
    /// Create a manager over freshly loaded settings
    pub fn new(settings: PromptManagerSettings, saver: impl SettingsSaver + 'static) -> Self {
        let ids = IdGenerator::seeded(settings.prompt_ids());
        Self {
            settings: new_shared_settings(settings),
            saver: Box::new(saver),
            ids,
        }
    }

    /// Handle to the shared settings, for the injection hook
    pub fn shared(&self) -> SharedSettings {
        self.settings.clone()
    }

    fn read(&self) -> PromptResult<RwLockReadGuard<'_, PromptManagerSettings>> {
        self.settings.read().map_err(|_| PromptError::LockPoisoned)
    }

    fn write(&self) -> PromptResult<RwLockWriteGuard<'_, PromptManagerSettings>> {
        self.settings.write().map_err(|_| PromptError::LockPoisoned)
    }

    /// Apply a mutation, then persist
    ///
    /// If either step fails the settings are restored to what they were
    /// before the call.
    fn mutate<R>(
        &self,
        f: impl FnOnce(&mut PromptManagerSettings) -> PromptResult<R>,
    ) -> PromptResult<R> {
        let mut guard = self.write()?;
        let before = guard.clone();
        let result = f(&mut guard).and_then(|out| self.saver.save(&guard).map(|()| out));
        if result.is_err() {
            *guard = before;
        }
        result
    }

    pub fn prompts(&self) -> PromptResult<Vec<PromptSlot>> {
        Ok(self.read()?.prompts.clone())
    }

    pub fn prompt(&self, id: PromptId) -> PromptResult<PromptRecord> {
        self.read()?
            .prompts
            .iter()
            .filter_map(PromptSlot::as_record)
            .find(|record| record.id == id)
            .cloned()
            .ok_or(PromptError::PromptNotFound(id))
    }

    /// Append a prompt with default values
    pub fn add_prompt(&mut self) -> PromptResult<PromptId> {
        self.add_prompt_with(Vec::new())
    }

    /// Append a prompt with default values, then apply `values`
    pub fn add_prompt_with(
        &mut self,
        values: impl IntoIterator<Item = FieldValue>,
    ) -> PromptResult<PromptId> {
        let id = self.ids.next_id();
        let mut record = PromptRecord::new(id);
        for value in values {
            value.apply(&mut record);
        }

        self.mutate(|settings| {
            settings.prompts.push(record.into());
            Ok(())
        })?;
        tracing::info!("Added prompt {}", id);
        Ok(id)
    }

    /// Remove a prompt, including a malformed entry that carries the id
    pub fn remove_prompt(&mut self, id: PromptId) -> PromptResult<()> {
        self.mutate(|settings| {
            let before = settings.prompts.len();
            settings.prompts.retain(|slot| slot.id() != Some(id));
            if settings.prompts.len() == before {
                return Err(PromptError::PromptNotFound(id));
            }
            Ok(())
        })?;
        tracing::info!("Removed prompt {}", id);
        Ok(())
    }

    /// Set one field of a prompt
    ///
    /// Malformed entries can be edited too; once the offending field is
    /// fixed they read as a regular prompt again.
    pub fn update_field(&mut self, id: PromptId, value: FieldValue) -> PromptResult<()> {
        let field = value.field();
        self.mutate(|settings| {
            let slot = settings
                .prompts
                .iter_mut()
                .find(|slot| slot.id() == Some(id))
                .ok_or(PromptError::PromptNotFound(id))?;
            value.apply_to_slot(slot);
            Ok(())
        })?;
        tracing::debug!("Updated {} on prompt {}", field, id);
        Ok(())
    }

    /// Set one field of a prompt from raw editor input
    pub fn apply_form_input(
        &mut self,
        id: PromptId,
        field: PromptField,
        input: FormInput,
    ) -> PromptResult<FieldValue> {
        let value = field.parse_input(input)?;
        self.update_field(id, value.clone())?;
        Ok(value)
    }

    /// Save `text` as a named template of a prompt
    ///
    /// Returns the trimmed name the template was stored under. An existing
    /// template with that name is overwritten.
    pub fn save_template(&mut self, id: PromptId, name: &str, text: &str) -> PromptResult<String> {
        if text.trim().is_empty() {
            return Err(PromptError::EmptyTemplateText);
        }
        let name = trimmed_name(name)?;

        self.mutate(|settings| {
            find_record_mut(settings, id)?
                .templates
                .insert(name.clone(), text.to_string());
            Ok(())
        })?;
        tracing::info!("Saved template \"{}\" on prompt {}", name, id);
        Ok(name)
    }

    /// Replace a prompt's text with one of its templates
    pub fn load_template(&mut self, id: PromptId, name: &str) -> PromptResult<String> {
        let name = name.trim();
        let text = self.mutate(|settings| {
            let record = find_record_mut(settings, id)?;
            let text = record
                .templates
                .get(name)
                .cloned()
                .ok_or_else(|| PromptError::TemplateNotFound {
                    id,
                    name: name.to_string(),
                })?;
            record.text = text.clone();
            Ok(text)
        })?;
        tracing::info!("Loaded template \"{}\" into prompt {}", name, id);
        Ok(text)
    }

    pub fn delete_template(&mut self, id: PromptId, name: &str) -> PromptResult<()> {
        let name = name.trim();
        self.mutate(|settings| {
            find_record_mut(settings, id)?
                .templates
                .remove(name)
                .map(|_| ())
                .ok_or_else(|| PromptError::TemplateNotFound {
                    id,
                    name: name.to_string(),
                })
        })?;
        tracing::info!("Deleted template \"{}\" from prompt {}", name, id);
        Ok(())
    }

    pub fn template_names(&self, id: PromptId) -> PromptResult<Vec<String>> {
        Ok(self.prompt(id)?.templates.into_keys().collect())
    }

    /// Snapshot the current prompt collection as a global preset
    pub fn save_preset(&mut self, name: &str) -> PromptResult<String> {
        let name = trimmed_name(name)?;
        self.mutate(|settings| {
            let preset = GlobalPreset {
                prompts: settings.prompts.clone(),
                saved_at: Some(Utc::now()),
            };
            settings.global_presets.insert(name.clone(), preset);
            Ok(())
        })?;
        tracing::info!("Saved global preset \"{}\"", name);
        Ok(name)
    }

    /// Replace the prompt collection with a copy of a preset's prompts
    pub fn load_preset(&mut self, name: &str) -> PromptResult<usize> {
        let name = name.trim();
        let count = self.mutate(|settings| {
            let prompts = settings
                .global_presets
                .get(name)
                .map(|preset| preset.prompts.clone())
                .ok_or_else(|| PromptError::PresetNotFound(name.to_string()))?;
            let count = prompts.len();
            settings.prompts = prompts;
            Ok(count)
        })?;
        tracing::info!("Loaded global preset \"{}\" ({} prompts)", name, count);
        Ok(count)
    }

    pub fn delete_preset(&mut self, name: &str) -> PromptResult<()> {
        let name = name.trim();
        self.mutate(|settings| {
            settings
                .global_presets
                .remove(name)
                .map(|_| ())
                .ok_or_else(|| PromptError::PresetNotFound(name.to_string()))
        })?;
        tracing::info!("Deleted global preset \"{}\"", name);
        Ok(())
    }

    pub fn preset_names(&self) -> PromptResult<Vec<String>> {
        Ok(self.read()?.global_presets.keys().cloned().collect())
    }

    /// Inject the current prompts into a conversation buffer
    pub fn inject(&self, chat: &mut Vec<Message>) -> PromptResult<InjectionReport> {
        Ok(inject(&self.read()?.prompts, chat))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompts::Position;
    use serde_json::json;
    use std::cell::Cell;
    use std::rc::Rc;

    fn manager() -> (PromptManager, Rc<Cell<usize>>) {
        let saves = Rc::new(Cell::new(0));
        let counter = saves.clone();
        let saver = move |_: &PromptManagerSettings| -> PromptResult<()> {
            counter.set(counter.get() + 1);
            Ok(())
        };
        (PromptManager::new(PromptManagerSettings::default(), saver), saves)
    }

    #[test]
    fn test_add_prompt_defaults() {
        let (mut manager, saves) = manager();

        let id = manager.add_prompt().unwrap();
        let record = manager.prompt(id).unwrap();

        assert_eq!(record.text, "");
        assert_eq!(record.position, Position::DeepSystem);
        assert_eq!(record.depth, 0);
        assert!(record.enabled);
        assert!(record.templates.is_empty());
        assert_eq!(saves.get(), 1);
    }

    #[test]
    fn test_ids_are_unique() {
        let (mut manager, _) = manager();

        let a = manager.add_prompt().unwrap();
        let b = manager.add_prompt().unwrap();
        manager.remove_prompt(b).unwrap();
        let c = manager.add_prompt().unwrap();

        assert_ne!(a, b);
        assert!(c > b);
    }

    #[test]
    fn test_remove_missing_prompt() {
        let (mut manager, saves) = manager();

        let result = manager.remove_prompt(PromptId::new(7));
        assert!(matches!(result, Err(PromptError::PromptNotFound(_))));
        assert_eq!(saves.get(), 0);
    }

    #[test]
    fn test_form_input_updates_field() {
        let (mut manager, saves) = manager();
        let id = manager.add_prompt().unwrap();

        manager
            .apply_form_input(id, PromptField::Depth, FormInput::Value("3".to_string()))
            .unwrap();
        manager
            .apply_form_input(id, PromptField::Enabled, FormInput::Checked(false))
            .unwrap();

        let record = manager.prompt(id).unwrap();
        assert_eq!(record.depth, 3);
        assert!(!record.enabled);
        assert_eq!(saves.get(), 3);
    }

    #[test]
    fn test_template_lifecycle() {
        let (mut manager, _) = manager();
        let id = manager.add_prompt().unwrap();

        let name = manager.save_template(id, "  greeting ", "Hello there").unwrap();
        assert_eq!(name, "greeting");
        assert_eq!(manager.template_names(id).unwrap(), vec!["greeting"]);

        manager
            .update_field(id, FieldValue::Text("changed".to_string()))
            .unwrap();
        let text = manager.load_template(id, "greeting").unwrap();
        assert_eq!(text, "Hello there");
        assert_eq!(manager.prompt(id).unwrap().text, "Hello there");

        manager.delete_template(id, "greeting").unwrap();
        assert!(manager.template_names(id).unwrap().is_empty());
        assert!(matches!(
            manager.load_template(id, "greeting"),
            Err(PromptError::TemplateNotFound { .. })
        ));
    }

    #[test]
    fn test_template_rejects_blank_input() {
        let (mut manager, saves) = manager();
        let id = manager.add_prompt().unwrap();

        assert!(matches!(
            manager.save_template(id, "name", "   "),
            Err(PromptError::EmptyTemplateText)
        ));
        assert!(matches!(
            manager.save_template(id, "  ", "text"),
            Err(PromptError::EmptyName)
        ));
        assert_eq!(saves.get(), 1);
    }

    #[test]
    fn test_presets_are_deep_copies() {
        let (mut manager, _) = manager();
        let id = manager
            .add_prompt_with([FieldValue::Text("original".to_string())])
            .unwrap();

        manager.save_preset("base").unwrap();
        manager
            .update_field(id, FieldValue::Text("edited".to_string()))
            .unwrap();
        assert_eq!(manager.prompt(id).unwrap().text, "edited");

        let count = manager.load_preset("base").unwrap();
        assert_eq!(count, 1);
        assert_eq!(manager.prompt(id).unwrap().text, "original");
        assert_eq!(manager.preset_names().unwrap(), vec!["base"]);

        manager.delete_preset("base").unwrap();
        assert!(matches!(
            manager.load_preset("base"),
            Err(PromptError::PresetNotFound(_))
        ));
    }

    #[test]
    fn test_inject_uses_current_prompts() {
        let (mut manager, _) = manager();
        manager
            .add_prompt_with([
                FieldValue::Text("note".to_string()),
                FieldValue::Position(Position::DeepUser),
            ])
            .unwrap();

        let mut chat = vec![Message::system("a")];
        let report = manager.inject(&mut chat).unwrap();

        assert_eq!(report.injected, 1);
        assert_eq!(chat, vec![Message::system("a"), Message::user("note")]);
    }

    #[test]
    fn test_set_field_repairs_malformed_entry() {
        let settings: PromptManagerSettings = serde_json::from_value(json!({
            "prompts": [{"id": 5, "text": 12, "enabled": true, "position": "deep_user"}]
        }))
        .unwrap();
        let saver = |_: &PromptManagerSettings| -> PromptResult<()> { Ok(()) };
        let mut manager = PromptManager::new(settings, saver);
        let id = PromptId::new(5);
        assert!(matches!(manager.prompt(id), Err(PromptError::PromptNotFound(_))));

        manager
            .update_field(id, FieldValue::Text("fixed".to_string()))
            .unwrap();

        assert_eq!(manager.prompt(id).unwrap().text, "fixed");
        let mut chat = vec![Message::system("a")];
        let report = manager.inject(&mut chat).unwrap();
        assert!(report.failed.is_empty());
        assert_eq!(chat, vec![Message::system("a"), Message::user("fixed")]);
    }

    #[test]
    fn test_failed_save_restores_settings() {
        let mut manager = PromptManager::new(
            PromptManagerSettings::default(),
            |_: &PromptManagerSettings| -> PromptResult<()> {
                Err(PromptError::Other("disk full".to_string()))
            },
        );

        assert!(manager.add_prompt().is_err());
        assert!(manager.prompts().unwrap().is_empty());
        assert!(manager.save_preset("base").is_err());
        assert!(manager.preset_names().unwrap().is_empty());
    }
}
