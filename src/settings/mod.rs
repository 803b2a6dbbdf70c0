//! Extension settings
//!
//! The host keeps one JSON document holding every extension's settings,
//! keyed by extension id. This module models our section of it, the
//! callback used to persist it and a file-backed implementation of that
//! callback.

mod storage;
mod store;

pub use storage::SettingsStorage;
pub use store::{
    new_shared_settings, ExtensionSettings, GlobalPreset, PromptManagerSettings, SettingsSaver,
    SharedSettings,
};
