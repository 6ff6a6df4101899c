//! Configuration types for the conversation loop.

use crate::error::{HarkError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration snapshot.
///
/// The loop holds one immutable snapshot for its whole lifetime and hands
/// it to every plugin hook.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarkConfig {
    /// Turn-taking settings (persona, empty-input behavior, filler set).
    pub conversation: ConversationConfig,
    /// Quiet-hours profile. Absent means notifications are always allowed.
    pub do_not_bother: Option<QuietHoursConfig>,
    /// Free-form per-plugin sections, keyed by plugin name.
    pub plugins: toml::Table,
}

/// Turn-taking configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationConfig {
    /// Wake keyword passed to passive listening.
    pub persona: String,
    /// Stay silent (log only) when active listening captured nothing.
    pub shut_up_if_no_input: bool,
    /// Pause between iterations while the microphone asked us to stop.
    pub stopped_backoff_ms: u64,
    /// Acknowledgments spoken when active listening captured nothing.
    pub filler_phrases: Vec<String>,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            persona: "hark".to_owned(),
            shut_up_if_no_input: false,
            stopped_backoff_ms: 1000,
            filler_phrases: crate::filler::default_phrases(),
        }
    }
}

/// Local wall-clock window during which queued notifications are held back.
///
/// `till <= since` wraps midnight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuietHoursConfig {
    /// Whether the window is in force.
    #[serde(default)]
    pub enable: bool,
    /// First blocked hour, `0..24`.
    #[serde(default)]
    pub since: Option<u32>,
    /// First allowed hour after the window, `0..24`.
    #[serde(default)]
    pub till: Option<u32>,
}

impl HarkConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content).map_err(|e| HarkError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise return defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be loaded.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| HarkError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `<config dir>/hark/config.toml`.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp/hark-config"))
            .join("hark")
            .join("config.toml")
    }

    /// Check value ranges that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`HarkError::Config`] describing the first violation found.
    pub fn validate(&self) -> Result<()> {
        if self.conversation.persona.trim().is_empty() {
            return Err(HarkError::Config("conversation.persona is empty".into()));
        }
        if self.conversation.filler_phrases.is_empty() {
            return Err(HarkError::Config(
                "conversation.filler_phrases must not be empty".into(),
            ));
        }
        if let Some(quiet) = &self.do_not_bother {
            for (key, hour) in [("since", quiet.since), ("till", quiet.till)] {
                if let Some(h) = hour
                    && h >= 24
                {
                    return Err(HarkError::Config(format!(
                        "do_not_bother.{key} must be in 0..24, got {h}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Section of the `[plugins]` table belonging to the named plugin.
    pub fn plugin_section(&self, name: &str) -> Option<&toml::Value> {
        self.plugins.get(name)
    }
}
