//! File-backed settings persistence
//!
//! Reads and writes the host settings document as pretty-printed JSON.
//! Saving only replaces this extension's section.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use super::store::{ExtensionSettings, PromptManagerSettings, SettingsSaver};
use crate::config::{Config, EXTENSION_ID};
use crate::core::PromptResult;

/// Settings document on disk
#[derive(Debug, Clone)]
pub struct SettingsStorage {
    path: PathBuf,
    extension_id: String,
}

impl SettingsStorage {
    /// Storage for the default extension section of the document at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            extension_id: EXTENSION_ID.to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            path: config.settings_path.clone(),
            extension_id: config.extension_id.clone(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the whole host document; a missing file is an empty document
    pub fn load_document(&self) -> PromptResult<ExtensionSettings> {
        if !self.path.exists() {
            return Ok(ExtensionSettings::default());
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Write the whole host document
    pub fn save_document(&self, document: &ExtensionSettings) -> PromptResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = File::create(&self.path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, document)?;
        writer.flush()?;
        Ok(())
    }

    /// Load this extension's settings, merged over defaults
    pub fn load(&self) -> PromptResult<PromptManagerSettings> {
        let document = self.load_document()?;
        let settings = PromptManagerSettings::from_extension(&document, &self.extension_id)?;
        tracing::info!(
            extension = %self.extension_id,
            "Loaded {} prompts and {} presets from {}",
            settings.prompts.len(),
            settings.global_presets.len(),
            self.path.display()
        );
        Ok(settings)
    }
}

impl SettingsSaver for SettingsStorage {
    fn save(&self, settings: &PromptManagerSettings) -> PromptResult<()> {
        let mut document = self.load_document()?;
        settings.write_to(&mut document, &self.extension_id)?;
        self.save_document(&document)?;
        tracing::debug!(extension = %self.extension_id, "Settings saved to {}", self.path.display());
        Ok(())
    }
}
