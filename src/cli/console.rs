use colored::*;

use crate::conversation::Message;
use crate::prompts::{PromptRecord, PromptSlot};

/// Console handles all terminal output with colored formatting
pub struct Console {
    accent_color: Color,
    muted_color: Color,
}

impl Console {
    /// Create a new Console with default colors
    pub fn new() -> Self {
        Self {
            accent_color: Color::Cyan,
            muted_color: Color::BrightBlack,
        }
    }

    /// Print the whole prompt collection
    pub fn print_prompt_list(&self, prompts: &[PromptSlot]) {
        if prompts.is_empty() {
            println!(
                "{}",
                "No prompts added. Run \"promptdeck add\" to start.".color(self.muted_color)
            );
            return;
        }

        for slot in prompts {
            match slot {
                PromptSlot::Record(record) => self.print_prompt(record),
                PromptSlot::Malformed(value) => {
                    let id = slot
                        .id()
                        .map(|id| id.to_string())
                        .unwrap_or_else(|| "?".to_string());
                    println!("{} {}", format!("[{}]", id).red().bold(), "malformed entry".red());
                    println!("    {}", value.to_string().color(self.muted_color));
                }
            }
            self.print_separator();
        }
    }

    /// Print a single prompt
    pub fn print_prompt(&self, record: &PromptRecord) {
        let status = if record.enabled {
            "[x]".green()
        } else {
            "[ ]".color(self.muted_color)
        };
        println!(
            "{} {} {} depth {}",
            status,
            record.id.to_string().color(self.accent_color).bold(),
            record.position,
            record.depth
        );

        if record.text.is_empty() {
            println!("    {}", "(empty)".color(self.muted_color));
        } else {
            for line in record.text.lines() {
                println!("    {}", line);
            }
        }

        if !record.templates.is_empty() {
            let names: Vec<&str> = record.templates.keys().map(String::as_str).collect();
            println!(
                "    {} {}",
                "templates:".color(self.muted_color),
                names.join(", ")
            );
        }
    }

    /// Print a titled list of names (templates, presets)
    pub fn print_names(&self, title: &str, names: &[String]) {
        println!("{}", title.color(self.accent_color).bold());
        if names.is_empty() {
            println!("  {}", "(none)".color(self.muted_color));
        }
        for name in names {
            println!("  - {}", name);
        }
    }

    /// Print a conversation entry
    pub fn print_message(&self, message: &Message) {
        let role = format!("{}:", message.role);
        let role = match message.role.as_str() {
            "user" => role.cyan().bold(),
            "assistant" => role.green().bold(),
            _ => role.yellow().bold(),
        };
        match message.text() {
            Some(text) => println!("{} {}", role, text),
            None => println!("{} {}", role, message.content.to_string().color(self.muted_color)),
        }
    }

    /// Print a success notice
    pub fn print_success(&self, message: &str) {
        println!("{} {}", "OK:".green().bold(), message);
    }

    /// Print an informational notice
    pub fn print_info(&self, message: &str) {
        println!("{} {}", "Info:".color(self.accent_color).bold(), message);
    }

    /// Print a warning
    pub fn print_warning(&self, message: &str) {
        eprintln!("{} {}", "Warning:".yellow().bold(), message);
    }

    /// Print an error message
    pub fn print_error(&self, error: &str) {
        eprintln!("{} {}", "Error:".red().bold(), error);
    }

    /// Print a separator line
    pub fn print_separator(&self) {
        println!("{}", "-".repeat(60).color(self.muted_color));
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}
