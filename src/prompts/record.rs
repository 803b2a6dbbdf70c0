//! Prompt records and their stored form

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::core::PromptError;

/// Opaque prompt identifier
///
/// Assigned once at creation time and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PromptId(u64);

impl PromptId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for PromptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PromptId {
    type Err = PromptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|_| PromptError::Other(format!("invalid prompt id: {}", s)))
    }
}

/// Hands out prompt ids
///
/// Ids are creation timestamps in milliseconds, bumped past the highest
/// id seen so far so two prompts created in the same millisecond (or
/// after a clock step backwards) never collide.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    last_issued: u64,
}

impl IdGenerator {
    /// Create a generator that will never hand out any of `ids`
    pub fn seeded(ids: impl IntoIterator<Item = PromptId>) -> Self {
        let mut generator = Self::default();
        for id in ids {
            generator.observe(id);
        }
        generator
    }

    /// Record an id that already exists
    pub fn observe(&mut self, id: PromptId) {
        self.last_issued = self.last_issued.max(id.0);
    }

    /// Issue a fresh id
    pub fn next_id(&mut self) -> PromptId {
        let now = Utc::now().timestamp_millis().max(0) as u64;
        let id = now.max(self.last_issued.saturating_add(1));
        self.last_issued = id;
        PromptId(id)
    }
}

/// Where an injected prompt lands, expressed as the role it speaks with
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Position {
    #[default]
    DeepSystem,
    DeepUser,
    DeepAssistant,
    /// Any other stored value; kept verbatim and injected as `system`
    Unknown(String),
}

impl Position {
    pub fn as_str(&self) -> &str {
        match self {
            Position::DeepSystem => "deep_system",
            Position::DeepUser => "deep_user",
            Position::DeepAssistant => "deep_assistant",
            Position::Unknown(raw) => raw,
        }
    }

    /// Conversational role for injected content
    pub fn role(&self) -> &'static str {
        match self {
            Position::DeepUser => "user",
            Position::DeepAssistant => "assistant",
            _ => "system",
        }
    }
}

impl From<&str> for Position {
    fn from(value: &str) -> Self {
        match value {
            "deep_system" => Position::DeepSystem,
            "deep_user" => Position::DeepUser,
            "deep_assistant" => Position::DeepAssistant,
            other => Position::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Position {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Position {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(position_from_value(&Value::deserialize(deserializer)?))
    }
}

pub(crate) fn position_from_value(value: &Value) -> Position {
    match value {
        Value::String(s) => Position::from(s.as_str()),
        _ => Position::DeepSystem,
    }
}

/// Parse the leading integer of a string, ignoring leading whitespace
/// and anything after the digits (`" 12px"` is 12, `"abc"` is `None`).
pub fn parse_leading_int(input: &str) -> Option<i64> {
    let trimmed = input.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let magnitude = digits[..end].bytes().fold(0i64, |acc, b| {
        acc.saturating_mul(10).saturating_add(i64::from(b - b'0'))
    });
    Some(if negative { -magnitude } else { magnitude })
}

/// Coerce a stored depth to a non-negative offset
///
/// Missing, null, negative and non-numeric values all become 0.
pub fn coerce_depth(value: &Value) -> usize {
    match value {
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                usize::try_from(u).unwrap_or(usize::MAX)
            } else if n.is_i64() {
                0
            } else {
                match n.as_f64() {
                    Some(f) if f.is_finite() && f >= 1.0 => f.trunc() as usize,
                    _ => 0,
                }
            }
        }
        Value::String(s) => parse_leading_int(s).map(depth_from_int).unwrap_or(0),
        _ => 0,
    }
}

/// Clamp a signed offset into `usize`; negatives become 0
pub(crate) fn depth_from_int(n: i64) -> usize {
    if n <= 0 {
        0
    } else {
        usize::try_from(n).unwrap_or(usize::MAX)
    }
}

fn lenient_depth<'de, D: Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
    Ok(coerce_depth(&Value::deserialize(deserializer)?))
}

/// A user-authored prompt plus its placement metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptRecord {
    pub id: PromptId,
    /// Content injected into the conversation
    pub text: String,
    #[serde(default)]
    pub position: Position,
    /// Offset from the end of the conversation; 0 appends
    #[serde(default, deserialize_with = "lenient_depth")]
    pub depth: usize,
    /// A missing flag reads as disabled
    #[serde(default)]
    pub enabled: bool,
    /// Saved snapshots of `text`, by name
    #[serde(default)]
    pub templates: BTreeMap<String, String>,
}

impl PromptRecord {
    /// A fresh, enabled, empty prompt appended at the end of the chat
    pub fn new(id: PromptId) -> Self {
        Self {
            id,
            text: String::new(),
            position: Position::DeepSystem,
            depth: 0,
            enabled: true,
            templates: BTreeMap::new(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// One entry of the stored prompt collection
///
/// Entries that do not parse as a [`PromptRecord`] are kept verbatim so
/// saving never drops user data. They can still be removed by id and are
/// reported individually when injection reaches them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PromptSlot {
    Record(PromptRecord),
    Malformed(Value),
}

impl PromptSlot {
    /// Read one stored entry, keeping it verbatim if it is not a valid record
    pub fn from_value(value: Value) -> Self {
        match serde_json::from_value::<PromptRecord>(value.clone()) {
            Ok(record) => PromptSlot::Record(record),
            Err(_) => PromptSlot::Malformed(value),
        }
    }

    pub fn id(&self) -> Option<PromptId> {
        match self {
            PromptSlot::Record(record) => Some(record.id),
            PromptSlot::Malformed(value) => value.get("id").and_then(Value::as_u64).map(PromptId),
        }
    }

    pub fn as_record(&self) -> Option<&PromptRecord> {
        match self {
            PromptSlot::Record(record) => Some(record),
            PromptSlot::Malformed(_) => None,
        }
    }

    pub fn as_record_mut(&mut self) -> Option<&mut PromptRecord> {
        match self {
            PromptSlot::Record(record) => Some(record),
            PromptSlot::Malformed(_) => None,
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, PromptSlot::Malformed(_))
    }
}

impl From<PromptRecord> for PromptSlot {
    fn from(record: PromptRecord) -> Self {
        PromptSlot::Record(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_position_roles() {
        assert_eq!(Position::DeepSystem.role(), "system");
        assert_eq!(Position::DeepUser.role(), "user");
        assert_eq!(Position::DeepAssistant.role(), "assistant");
        assert_eq!(Position::from("in_chat").role(), "system");
        assert_eq!(Position::from("").role(), "system");
    }

    #[test]
    fn test_unknown_position_round_trips() {
        let position: Position = serde_json::from_value(json!("after_char")).unwrap();
        assert_eq!(position, Position::Unknown("after_char".to_string()));
        assert_eq!(serde_json::to_value(&position).unwrap(), json!("after_char"));

        let position: Position = serde_json::from_value(json!(3)).unwrap();
        assert_eq!(position, Position::DeepSystem);
    }

    #[test]
    fn test_parse_leading_int() {
        assert_eq!(parse_leading_int("42"), Some(42));
        assert_eq!(parse_leading_int("  7 messages"), Some(7));
        assert_eq!(parse_leading_int("-3"), Some(-3));
        assert_eq!(parse_leading_int("+5"), Some(5));
        assert_eq!(parse_leading_int("abc"), None);
        assert_eq!(parse_leading_int(""), None);
        assert_eq!(parse_leading_int("-"), None);
    }

    #[test]
    fn test_coerce_depth() {
        assert_eq!(coerce_depth(&json!(3)), 3);
        assert_eq!(coerce_depth(&json!(-2)), 0);
        assert_eq!(coerce_depth(&json!(2.9)), 2);
        assert_eq!(coerce_depth(&json!(0.5)), 0);
        assert_eq!(coerce_depth(&json!("4")), 4);
        assert_eq!(coerce_depth(&json!("deep")), 0);
        assert_eq!(coerce_depth(&json!(null)), 0);
        assert_eq!(coerce_depth(&json!(true)), 0);
        assert_eq!(coerce_depth(&json!(u64::MAX)), usize::MAX);
        assert_eq!(coerce_depth(&json!("99999999999999999999")), usize::MAX);
    }

    #[test]
    fn test_slot_from_value() {
        let slot = PromptSlot::from_value(json!({"id": 8, "text": "fine"}));
        assert_eq!(slot.as_record().map(|r| r.text.as_str()), Some("fine"));

        let raw = json!({"id": 9, "text": false});
        assert_eq!(PromptSlot::from_value(raw.clone()), PromptSlot::Malformed(raw));
    }

    #[test]
    fn test_record_defaults_from_sparse_json() {
        let record: PromptRecord = serde_json::from_value(json!({
            "id": 1700000000000u64,
            "text": "stay in character",
            "depth": null
        }))
        .unwrap();

        assert_eq!(record.position, Position::DeepSystem);
        assert_eq!(record.depth, 0);
        assert!(!record.enabled);
        assert!(record.templates.is_empty());
    }

    #[test]
    fn test_slot_keeps_malformed_entries() {
        let slots: Vec<PromptSlot> = serde_json::from_value(json!([
            {"id": 1, "text": "ok", "enabled": true},
            {"id": 2, "text": 17, "enabled": true}
        ]))
        .unwrap();

        assert!(!slots[0].is_malformed());
        assert!(slots[1].is_malformed());
        assert_eq!(slots[1].id(), Some(PromptId::new(2)));

        let back = serde_json::to_value(&slots).unwrap();
        assert_eq!(back[1]["text"], json!(17));
    }

    #[test]
    fn test_id_generator_never_repeats() {
        let far_future = PromptId::new(u64::MAX / 2);
        let mut generator = IdGenerator::seeded([PromptId::new(5), far_future]);

        let first = generator.next_id();
        let second = generator.next_id();
        assert!(first > far_future);
        assert!(second > first);
    }
}
