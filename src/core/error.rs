//! Error types for promptdeck

use thiserror::Error;

use crate::prompts::PromptId;

/// Main error type for prompt management and injection
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Prompt not found: {0}")]
    PromptNotFound(PromptId),

    #[error("Template \"{name}\" not found on prompt {id}")]
    TemplateNotFound { id: PromptId, name: String },

    #[error("Global preset not found: {0}")]
    PresetNotFound(String),

    #[error("Name must not be empty")]
    EmptyName,

    #[error("There is no text to save")]
    EmptyTemplateText,

    #[error("Malformed prompt record: {0}")]
    MalformedRecord(String),

    #[error("Invalid input for field {field}: {reason}")]
    InvalidFieldInput { field: &'static str, reason: String },

    #[error("Unknown prompt field: {0}")]
    UnknownField(String),

    #[error("Settings lock poisoned")]
    LockPoisoned,

    #[error("{0}")]
    Other(String),
}

/// Result type alias
pub type PromptResult<T> = std::result::Result<T, PromptError>;
