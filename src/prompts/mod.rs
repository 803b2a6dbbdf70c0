//! Prompt records, field edits and the prompt manager
//!
//! - [`PromptRecord`]: a prompt with its placement metadata
//! - [`PromptSlot`]: a stored entry, well-formed or kept verbatim
//! - [`PromptField`]: the closed set of editable fields
//! - [`PromptManager`]: CRUD, templates and global presets over shared settings

mod field;
mod manager;
pub(crate) mod record;

pub use field::{FieldKind, FieldValue, FormInput, PromptField};
pub use manager::PromptManager;
pub use record::{
    coerce_depth, parse_leading_int, IdGenerator, Position, PromptId, PromptRecord, PromptSlot,
};
