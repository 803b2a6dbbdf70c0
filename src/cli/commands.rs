//! Command handlers
//!
//! Each handler performs one action through [`PromptManager`] and
//! reports the outcome on the console.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use super::args::{Commands, PresetAction, TemplateAction};
use super::console::Console;
use crate::conversation::ChatCompletionPayload;
use crate::extension::PromptExtension;
use crate::hooks::{HookEvent, HookRegistry};
use crate::prompts::{FormInput, PromptField, PromptManager};
use crate::settings::SettingsStorage;

/// Run one command against the settings in `storage`
pub fn run(command: Commands, storage: SettingsStorage, console: &Console) -> Result<()> {
    let settings = storage
        .load()
        .with_context(|| format!("failed to load settings from {}", storage.path().display()))?;
    let mut manager = PromptManager::new(settings, storage);

    match command {
        Commands::List => console.print_prompt_list(&manager.prompts()?),
        Commands::Add {
            text,
            position,
            depth,
            disabled,
        } => {
            let inputs = [
                (PromptField::Text, text.map(FormInput::Value)),
                (PromptField::Position, position.map(FormInput::Value)),
                (PromptField::Depth, depth.map(FormInput::Value)),
                (PromptField::Enabled, disabled.then_some(FormInput::Checked(false))),
            ];
            let mut values = Vec::new();
            for (field, input) in inputs {
                if let Some(input) = input {
                    values.push(field.parse_input(input)?);
                }
            }

            let id = manager.add_prompt_with(values)?;
            console.print_success(&format!("Prompt {} added", id));
        }
        Commands::Remove { id } => {
            manager.remove_prompt(id)?;
            console.print_success(&format!("Prompt {} removed", id));
        }
        Commands::Set { id, field, value } => {
            manager.apply_form_input(id, field, FormInput::Value(value))?;
            match manager.prompt(id) {
                Ok(record) => console.print_prompt(&record),
                Err(_) => console.print_warning(&format!(
                    "Updated {} on prompt {}, but the entry is still malformed",
                    field, id
                )),
            }
        }
        Commands::Template { action } => run_template(action, &mut manager, console)?,
        Commands::Preset { action } => run_preset(action, &mut manager, console)?,
        Commands::Inject { chat, json } => run_inject(&chat, json, &manager, console)?,
    }

    Ok(())
}

fn run_template(action: TemplateAction, manager: &mut PromptManager, console: &Console) -> Result<()> {
    match action {
        TemplateAction::Save { id, name, text } => {
            let text = match text {
                Some(text) => text,
                None => manager.prompt(id)?.text,
            };
            let name = manager.save_template(id, &name, &text)?;
            console.print_success(&format!("Template \"{}\" saved!", name));
        }
        TemplateAction::Load { id, name } => {
            manager.load_template(id, &name)?;
            console.print_info(&format!("Template \"{}\" loaded!", name.trim()));
        }
        TemplateAction::Delete { id, name } => {
            manager.delete_template(id, &name)?;
            console.print_info(&format!("Template \"{}\" deleted.", name.trim()));
        }
        TemplateAction::List { id } => {
            console.print_names(&format!("Templates of prompt {}", id), &manager.template_names(id)?);
        }
    }
    Ok(())
}

fn run_preset(action: PresetAction, manager: &mut PromptManager, console: &Console) -> Result<()> {
    match action {
        PresetAction::Save { name } => {
            let name = manager.save_preset(&name)?;
            console.print_success(&format!("Global Preset \"{}\" saved!", name));
        }
        PresetAction::Load { name } => {
            let count = manager.load_preset(&name)?;
            console.print_success(&format!(
                "Global Preset \"{}\" loaded! ({} prompts)",
                name.trim(),
                count
            ));
        }
        PresetAction::Delete { name } => {
            manager.delete_preset(&name)?;
            console.print_info(&format!("Global Preset \"{}\" deleted.", name.trim()));
        }
        PresetAction::List => console.print_names("Global presets", &manager.preset_names()?),
    }
    Ok(())
}

fn run_inject(path: &Path, json: bool, manager: &PromptManager, console: &Console) -> Result<()> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read chat payload {}", path.display()))?;
    let mut payload = ChatCompletionPayload::from_json(&raw)?;

    let mut hooks = HookRegistry::new();
    PromptExtension::new(manager.shared()).register(&mut hooks);
    let summary = hooks.emit(HookEvent::ChatCompletionPromptReady, &mut payload);
    if summary.failed > 0 {
        console.print_warning("Prompt injection failed; see the log for details");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        for message in &payload.chat {
            console.print_message(message);
        }
    }
    Ok(())
}
