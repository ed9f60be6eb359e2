//! Configuration settings for studysync.
//!
//! Settings are loaded from `~/.studysync/config.yaml`.

use serde::{Deserialize, Serialize};

use crate::cli::args::OutputFormat;
use crate::error::StudySyncError;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// General settings.
    pub general: GeneralConfig,
    /// Offline queue settings.
    pub sync: SyncConfig,
    /// Progress tracking settings.
    pub progress: ProgressConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Default output format.
    #[serde(default = "default_output_format")]
    pub default_output: OutputFormat,
    /// Color output setting.
    #[serde(default = "default_color")]
    pub color: ColorSetting,
}

/// Color output setting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ColorSetting {
    /// Auto-detect based on terminal.
    #[default]
    Auto,
    /// Always use colors.
    Always,
    /// Never use colors.
    Never,
}

impl ColorSetting {
    /// Apply this setting to the `colored` crate's global override.
    pub fn apply(self) {
        match self {
            Self::Auto => colored::control::unset_override(),
            Self::Always => colored::control::set_override(true),
            Self::Never => colored::control::set_override(false),
        }
    }
}

/// Offline queue settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Storage slot holding the persisted mutation queue.
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    /// File (relative to the data root) the outbox delegate appends to.
    #[serde(default = "default_outbox_file")]
    pub outbox_file: String,
}

/// Progress tracking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressConfig {
    /// Seconds between session-timer samples.
    #[serde(default = "default_session_interval")]
    pub session_interval_secs: u64,
}

const fn default_output_format() -> OutputFormat {
    OutputFormat::Pretty
}

const fn default_color() -> ColorSetting {
    ColorSetting::Auto
}

fn default_storage_key() -> String {
    crate::features::offline::DEFAULT_STORAGE_KEY.to_string()
}

fn default_outbox_file() -> String {
    "outbox.jsonl".to_string()
}

const fn default_session_interval() -> u64 {
    30
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_output: default_output_format(),
            color: default_color(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            storage_key: default_storage_key(),
            outbox_file: default_outbox_file(),
        }
    }
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            session_interval_secs: default_session_interval(),
        }
    }
}

impl Config {
    /// Load configuration from a specific path.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed, or
    /// if it sets a zero session interval.
    pub fn load_from_path(path: &std::path::Path) -> Result<Self, StudySyncError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            StudySyncError::Config(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;

        let config: Self = serde_yaml::from_str(&contents).map_err(|e| {
            StudySyncError::Config(format!(
                "Failed to parse config file {}: {e}",
                path.display()
            ))
        })?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), StudySyncError> {
        if self.progress.session_interval_secs == 0 {
            return Err(StudySyncError::Config(
                "progress.session_interval_secs must be greater than zero".to_string(),
            ));
        }
        if self.sync.storage_key.trim().is_empty() {
            return Err(StudySyncError::Config(
                "sync.storage_key must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
