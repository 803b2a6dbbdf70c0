//! Runtime configuration

use std::path::PathBuf;

/// Key under which this extension's settings live in the host document
pub const EXTENSION_ID: &str = "prompt_manager_final";

/// Default settings document
const SETTINGS_FILE: &str = "settings.json";

/// Default log directory
const LOG_DIR: &str = "logs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Section key in the host settings document
    pub extension_id: String,
    /// Host settings document
    pub settings_path: PathBuf,
    /// Directory for rotated log files
    pub log_dir: PathBuf,
}

impl Config {
    pub fn with_settings_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings_path = path.into();
        self
    }

    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = dir.into();
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extension_id: EXTENSION_ID.to_string(),
            settings_path: PathBuf::from(SETTINGS_FILE),
            log_dir: PathBuf::from(LOG_DIR),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides() {
        let config = Config::default()
            .with_settings_path("/tmp/st/settings.json")
            .with_log_dir("/tmp/st/logs");

        assert_eq!(config.extension_id, EXTENSION_ID);
        assert_eq!(config.settings_path, PathBuf::from("/tmp/st/settings.json"));
        assert_eq!(config.log_dir, PathBuf::from("/tmp/st/logs"));
    }
}
