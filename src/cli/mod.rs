//! Command-line presentation layer
//!
//! Talks to the library only through [`PromptManager`](crate::prompts::PromptManager)
//! and the prompt data model.

mod args;
mod commands;
mod console;

pub use args::{Cli, Commands, PresetAction, TemplateAction};
pub use commands::run;
pub use console::Console;
