//! Command-line arguments

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::prompts::{PromptField, PromptId};

#[derive(Parser, Debug)]
#[command(name = "promptdeck")]
#[command(version, about = "Manage prompts injected into chat-completion requests", long_about = None)]
pub struct Cli {
    /// Host settings document
    #[arg(short, long, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Directory for log files
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show every stored prompt
    List,

    /// Add a prompt
    Add {
        /// Prompt text
        #[arg(long)]
        text: Option<String>,

        /// deep_system, deep_user or deep_assistant
        #[arg(long)]
        position: Option<String>,

        /// Messages counted back from the end of the chat (0 appends)
        #[arg(long)]
        depth: Option<String>,

        /// Store the prompt disabled
        #[arg(long)]
        disabled: bool,
    },

    /// Remove a prompt
    Remove { id: PromptId },

    /// Set one field of a prompt (enabled, text, position, depth)
    Set {
        id: PromptId,
        field: PromptField,
        value: String,
    },

    /// Manage a prompt's templates
    Template {
        #[command(subcommand)]
        action: TemplateAction,
    },

    /// Manage global presets
    Preset {
        #[command(subcommand)]
        action: PresetAction,
    },

    /// Run a chat payload (JSON file) through the injection hook
    Inject {
        /// Payload object with a "chat" array, or a bare message array
        chat: PathBuf,

        /// Print the resulting payload as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum TemplateAction {
    /// Save text (default: the prompt's current text) as a template
    Save {
        id: PromptId,
        name: String,
        #[arg(long)]
        text: Option<String>,
    },
    /// Replace the prompt's text with a template
    Load { id: PromptId, name: String },
    /// Delete a template
    Delete { id: PromptId, name: String },
    /// List a prompt's templates
    List { id: PromptId },
}

#[derive(Subcommand, Debug)]
pub enum PresetAction {
    /// Save all prompts as a preset
    Save { name: String },
    /// Replace all prompts with a preset
    Load { name: String },
    /// Delete a preset
    Delete { name: String },
    /// List presets
    List,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
