//! In-memory settings model

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::core::PromptResult;
use crate::prompts::{PromptId, PromptSlot};

/// A named snapshot of the whole prompt collection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalPreset {
    #[serde(default, deserialize_with = "lenient_prompts")]
    pub prompts: Vec<PromptSlot>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_timestamp"
    )]
    pub saved_at: Option<DateTime<Utc>>,
}

/// A prompt collection that is not an array reads as empty
fn lenient_prompts<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<PromptSlot>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(entries) => entries.into_iter().map(PromptSlot::from_value).collect(),
        Value::Null => Vec::new(),
        other => {
            tracing::warn!("Ignoring stored prompts: expected an array, found {}", other);
            Vec::new()
        }
    })
}

/// Unreadable presets are skipped so the rest of the section still loads
fn lenient_presets<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<String, GlobalPreset>, D::Error> {
    let entries = match Value::deserialize(deserializer)? {
        Value::Object(entries) => entries,
        Value::Null => return Ok(BTreeMap::new()),
        other => {
            tracing::warn!("Ignoring stored presets: expected an object, found {}", other);
            return Ok(BTreeMap::new());
        }
    };

    Ok(entries
        .into_iter()
        .filter_map(|(name, value)| match serde_json::from_value(value) {
            Ok(preset) => Some((name, preset)),
            Err(e) => {
                tracing::warn!(preset = %name, "Skipping unreadable global preset: {}", e);
                None
            }
        })
        .collect())
}

fn lenient_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    Ok(serde_json::from_value(Value::deserialize(deserializer)?).unwrap_or(None))
}

/// This extension's section of the host settings
///
/// Keys missing from stored settings fall back to their defaults one by
/// one, so older documents keep loading as fields are added.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromptManagerSettings {
    #[serde(default, deserialize_with = "lenient_prompts")]
    pub prompts: Vec<PromptSlot>,
    #[serde(default, deserialize_with = "lenient_presets")]
    pub global_presets: BTreeMap<String, GlobalPreset>,
}

impl PromptManagerSettings {
    /// Read our section from the host document, merged over defaults
    pub fn from_extension(settings: &ExtensionSettings, extension_id: &str) -> PromptResult<Self> {
        match settings.section(extension_id) {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(section) if section.is_object() => Ok(serde_json::from_value(section.clone())?),
            Some(other) => {
                tracing::warn!(
                    extension = extension_id,
                    "Settings section is not an object, using defaults: {}",
                    other
                );
                Ok(Self::default())
            }
        }
    }

    /// Write our section back into the host document
    pub fn write_to(&self, settings: &mut ExtensionSettings, extension_id: &str) -> PromptResult<()> {
        settings.set_section(extension_id, serde_json::to_value(self)?);
        Ok(())
    }

    /// Ids of every stored prompt, including malformed entries that carry one
    pub fn prompt_ids(&self) -> impl Iterator<Item = PromptId> + '_ {
        self.prompts
            .iter()
            .chain(self.global_presets.values().flat_map(|p| p.prompts.iter()))
            .filter_map(PromptSlot::id)
    }
}

/// The host's settings document: extension id to settings value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtensionSettings(Map<String, Value>);

impl ExtensionSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn section(&self, extension_id: &str) -> Option<&Value> {
        self.0.get(extension_id)
    }

    pub fn set_section(&mut self, extension_id: impl Into<String>, value: Value) {
        self.0.insert(extension_id.into(), value);
    }
}

/// Persistence callback supplied by the host
///
/// Called after every mutation. Implementations may debounce.
pub trait SettingsSaver {
    fn save(&self, settings: &PromptManagerSettings) -> PromptResult<()>;
}

impl<F> SettingsSaver for F
where
    F: Fn(&PromptManagerSettings) -> PromptResult<()>,
{
    fn save(&self, settings: &PromptManagerSettings) -> PromptResult<()> {
        self(settings)
    }
}

/// Settings shared between the manager and the injection hook
pub type SharedSettings = Arc<RwLock<PromptManagerSettings>>;

/// Wrap settings for sharing
pub fn new_shared_settings(settings: PromptManagerSettings) -> SharedSettings {
    Arc::new(RwLock::new(settings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EXTENSION_ID;
    use serde_json::json;

    #[test]
    fn test_missing_section_uses_defaults() {
        let doc = ExtensionSettings::new();
        let settings = PromptManagerSettings::from_extension(&doc, EXTENSION_ID).unwrap();
        assert!(settings.prompts.is_empty());
        assert!(settings.global_presets.is_empty());
    }

    #[test]
    fn test_partial_section_merges_over_defaults() {
        let doc: ExtensionSettings = serde_json::from_value(json!({
            "other_extension": {"enabled": true},
            "prompt_manager_final": {
                "prompts": [{"id": 1, "text": "hi", "enabled": true}]
            }
        }))
        .unwrap();

        let settings = PromptManagerSettings::from_extension(&doc, EXTENSION_ID).unwrap();
        assert_eq!(settings.prompts.len(), 1);
        assert!(settings.global_presets.is_empty());
    }

    #[test]
    fn test_write_to_leaves_other_sections() {
        let mut doc: ExtensionSettings =
            serde_json::from_value(json!({"other_extension": {"x": 1}})).unwrap();

        PromptManagerSettings::default()
            .write_to(&mut doc, EXTENSION_ID)
            .unwrap();

        assert_eq!(doc.section("other_extension"), Some(&json!({"x": 1})));
        assert_eq!(
            doc.section(EXTENSION_ID),
            Some(&json!({"prompts": [], "global_presets": {}}))
        );
    }

    #[test]
    fn test_prompt_ids_include_presets() {
        let settings: PromptManagerSettings = serde_json::from_value(json!({
            "prompts": [{"id": 4, "text": "a"}],
            "global_presets": {"old": {"prompts": [{"id": 9, "text": "b"}]}}
        }))
        .unwrap();

        let ids: Vec<u64> = settings.prompt_ids().map(|id| id.as_u64()).collect();
        assert_eq!(ids, vec![4, 9]);
    }

    #[test]
    fn test_null_or_odd_prompts_read_as_empty() {
        for prompts in [json!(null), json!("nope"), json!({"id": 1})] {
            let doc: ExtensionSettings =
                serde_json::from_value(json!({"prompt_manager_final": {"prompts": prompts}}))
                    .unwrap();
            let settings = PromptManagerSettings::from_extension(&doc, EXTENSION_ID).unwrap();
            assert!(settings.prompts.is_empty());
        }
    }

    #[test]
    fn test_unreadable_presets_are_skipped() {
        let doc: ExtensionSettings = serde_json::from_value(json!({
            "prompt_manager_final": {
                "prompts": [{"id": 1, "text": "hi", "enabled": true}],
                "global_presets": {
                    "bad": null,
                    "worse": "text",
                    "empty": {"prompts": null},
                    "good": {"prompts": [{"id": 2, "text": "b"}], "saved_at": "last week"}
                }
            }
        }))
        .unwrap();

        let settings = PromptManagerSettings::from_extension(&doc, EXTENSION_ID).unwrap();
        assert_eq!(settings.prompts.len(), 1);
        let names: Vec<&str> = settings.global_presets.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["empty", "good"]);
        assert!(settings.global_presets["empty"].prompts.is_empty());
        assert_eq!(settings.global_presets["good"].prompts.len(), 1);
        assert_eq!(settings.global_presets["good"].saved_at, None);
    }

    #[test]
    fn test_non_object_section_uses_defaults() {
        let doc: ExtensionSettings =
            serde_json::from_value(json!({"prompt_manager_final": "corrupt"})).unwrap();
        let settings = PromptManagerSettings::from_extension(&doc, EXTENSION_ID).unwrap();
        assert_eq!(settings, PromptManagerSettings::default());
    }
}
