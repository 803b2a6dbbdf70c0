//! Field-level prompt edits
//!
//! Editors report changes as (field, raw input) pairs. The field table
//! below is the single place that maps a field to its form identifier,
//! its input kind and the typed value it produces.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use super::record::{depth_from_int, parse_leading_int, Position, PromptRecord, PromptSlot};
use crate::core::{PromptError, PromptResult};

/// How an editor reports a field's value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Checkbox,
    Value,
    Number,
}

/// Editable prompt fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptField {
    Enabled,
    Text,
    Position,
    Depth,
}

struct FieldSpec {
    field: PromptField,
    form_id: &'static str,
    name: &'static str,
    kind: FieldKind,
}

static FIELDS: [FieldSpec; 4] = [
    FieldSpec {
        field: PromptField::Enabled,
        form_id: "pm_prompt_enabled",
        name: "enabled",
        kind: FieldKind::Checkbox,
    },
    FieldSpec {
        field: PromptField::Text,
        form_id: "pm_prompt_text",
        name: "text",
        kind: FieldKind::Value,
    },
    FieldSpec {
        field: PromptField::Position,
        form_id: "pm_prompt_position",
        name: "position",
        kind: FieldKind::Value,
    },
    FieldSpec {
        field: PromptField::Depth,
        form_id: "pm_prompt_depth",
        name: "depth",
        kind: FieldKind::Number,
    },
];

/// Raw editor input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormInput {
    /// Checkbox state
    Checked(bool),
    /// Text from an input, textarea or select
    Value(String),
}

/// A typed value for one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Enabled(bool),
    Text(String),
    Position(Position),
    Depth(usize),
}

impl PromptField {
    pub fn all() -> impl Iterator<Item = PromptField> {
        FIELDS.iter().map(|spec| spec.field)
    }

    fn spec(self) -> &'static FieldSpec {
        // FIELDS is declared in enum order
        &FIELDS[self as usize]
    }

    /// Look a field up by its editor form identifier
    pub fn from_form_id(form_id: &str) -> Option<PromptField> {
        FIELDS
            .iter()
            .find(|spec| spec.form_id == form_id)
            .map(|spec| spec.field)
    }

    pub fn form_id(self) -> &'static str {
        self.spec().form_id
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }

    pub fn kind(self) -> FieldKind {
        self.spec().kind
    }

    /// Convert raw editor input into a typed value for this field
    ///
    /// Number fields take the leading integer of the input; anything
    /// unparsable or negative becomes 0.
    pub fn parse_input(self, input: FormInput) -> PromptResult<FieldValue> {
        match (self.kind(), input) {
            (FieldKind::Checkbox, FormInput::Checked(checked)) => Ok(FieldValue::Enabled(checked)),
            (FieldKind::Checkbox, FormInput::Value(raw)) => {
                match raw.trim().to_ascii_lowercase().as_str() {
                    "true" | "on" | "1" | "yes" => Ok(FieldValue::Enabled(true)),
                    "false" | "off" | "0" | "no" | "" => Ok(FieldValue::Enabled(false)),
                    _ => Err(PromptError::InvalidFieldInput {
                        field: self.name(),
                        reason: format!("expected a boolean, got \"{}\"", raw),
                    }),
                }
            }
            (FieldKind::Number, FormInput::Value(raw)) => {
                let depth = parse_leading_int(&raw).map(depth_from_int).unwrap_or(0);
                Ok(FieldValue::Depth(depth))
            }
            (FieldKind::Value, FormInput::Value(raw)) => Ok(match self {
                PromptField::Position => FieldValue::Position(Position::from(raw.as_str())),
                _ => FieldValue::Text(raw),
            }),
            (_, FormInput::Checked(_)) => Err(PromptError::InvalidFieldInput {
                field: self.name(),
                reason: "field is not a checkbox".to_string(),
            }),
        }
    }
}

impl fmt::Display for PromptField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PromptField {
    type Err = PromptError;

    /// Accepts either the short name (`depth`) or the form id (`pm_prompt_depth`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FIELDS
            .iter()
            .find(|spec| spec.name == s || spec.form_id == s)
            .map(|spec| spec.field)
            .ok_or_else(|| PromptError::UnknownField(s.to_string()))
    }
}

impl FieldValue {
    pub fn field(&self) -> PromptField {
        match self {
            FieldValue::Enabled(_) => PromptField::Enabled,
            FieldValue::Text(_) => PromptField::Text,
            FieldValue::Position(_) => PromptField::Position,
            FieldValue::Depth(_) => PromptField::Depth,
        }
    }

    /// Write this value into a record
    pub fn apply(self, record: &mut PromptRecord) {
        match self {
            FieldValue::Enabled(enabled) => record.enabled = enabled,
            FieldValue::Text(text) => record.text = text,
            FieldValue::Position(position) => record.position = position,
            FieldValue::Depth(depth) => record.depth = depth,
        }
    }

    /// Stored JSON form of this value
    pub fn to_value(&self) -> Value {
        match self {
            FieldValue::Enabled(enabled) => Value::Bool(*enabled),
            FieldValue::Text(text) => Value::String(text.clone()),
            FieldValue::Position(position) => Value::String(position.as_str().to_string()),
            FieldValue::Depth(depth) => Value::from(*depth),
        }
    }

    /// Write this value into a stored entry
    ///
    /// A malformed entry gets the field set on its raw JSON and is read
    /// again, so fixing the offending field turns it back into a record.
    pub fn apply_to_slot(self, slot: &mut PromptSlot) {
        match slot {
            PromptSlot::Record(record) => self.apply(record),
            PromptSlot::Malformed(raw) => {
                let mut raw = std::mem::take(raw);
                if let Some(fields) = raw.as_object_mut() {
                    fields.insert(self.field().name().to_string(), self.to_value());
                }
                *slot = PromptSlot::from_value(raw);
            }
        }
    }
}
