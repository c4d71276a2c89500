//! Console settings

use std::path::{Path, PathBuf};

use rpt_bridging::{AudioFormat, FormatCaps, RepeaterConfig};
use rpt_sim::SimConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Errors reading or writing the settings file
#[derive(Debug, Error)]
pub enum SettingsError {
    /// No home or XDG config directory
    #[error("could not determine settings path")]
    NoConfigDir,

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Console settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// Repeaters to start
    #[serde(default = "default_repeaters")]
    pub repeaters: Vec<RepeaterConfig>,
    /// Audio formats offered when requesting channels
    #[serde(default = "default_formats")]
    pub formats: Vec<AudioFormat>,
    /// Behaviour of the simulated host
    #[serde(default)]
    pub simulation: SimConfig,
}

fn default_repeaters() -> Vec<RepeaterConfig> {
    vec![RepeaterConfig::default()]
}

fn default_formats() -> Vec<AudioFormat> {
    vec![AudioFormat::Slin]
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            repeaters: default_repeaters(),
            formats: default_formats(),
            simulation: SimConfig::default(),
        }
    }
}

impl Settings {
    /// Get the XDG config directory for the repeater console
    /// Uses $XDG_CONFIG_HOME/repeater, falls back to ~/.config/repeater
    fn config_dir() -> Option<PathBuf> {
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_config);
            if path.is_absolute() {
                return Some(path.join("repeater"));
            }
        }

        dirs::home_dir().map(|h| h.join(".config").join("repeater"))
    }

    /// Get the settings file path
    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.json"))
    }

    /// Load settings from the default location, falling back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        Self::load_from(&path).unwrap_or_else(|e| {
            warn!("{}, using defaults", e);
            Self::default()
        })
    }

    /// Load settings from a specific file
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save settings to the default location
    pub fn save(&self) -> Result<(), SettingsError> {
        let path = Self::settings_path().ok_or(SettingsError::NoConfigDir)?;
        self.save_to(&path)
    }

    /// Save settings to a specific file
    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| SettingsError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Offered formats as a capability set
    pub fn caps(&self) -> FormatCaps {
        self.formats.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use rpt_bridging::ChannelKind;
    use rpt_sim::DialOutcome;

    use super::*;

    #[test]
    fn test_empty_object_uses_defaults() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, Settings::default());
        assert!(settings.caps().contains(AudioFormat::Slin));
    }

    #[test]
    fn test_parse_full_settings() {
        let json = r#"{
            "repeaters": [
                {"name": "2000", "rx_channel": "SIP/rx", "tx_channel": "SIP/tx",
                 "pseudo_channels": ["Monitor", "Parrot"]}
            ],
            "formats": ["Ulaw", "Slin"],
            "simulation": {"dial_outcome": "NoAnswer", "busy_devices": ["3"]}
        }"#;
        let settings: Settings = serde_json::from_str(json).unwrap();

        assert_eq!(settings.repeaters.len(), 1);
        assert_eq!(settings.repeaters[0].tx_channel.as_deref(), Some("SIP/tx"));
        assert_eq!(
            settings.repeaters[0].pseudo_channels,
            vec![ChannelKind::Monitor, ChannelKind::Parrot]
        );
        assert_eq!(settings.simulation.dial_outcome, DialOutcome::NoAnswer);
        assert_eq!(settings.simulation.busy_devices, vec!["3".to_string()]);
        assert!(settings.caps().contains(AudioFormat::Ulaw));
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = std::env::temp_dir().join(format!("rpt-console-test-{}", std::process::id()));
        let path = dir.join("settings.json");
        let mut settings = Settings::default();
        settings.repeaters[0].name = "2468".to_string();

        settings.save_to(&path).unwrap();
        let loaded = Settings::load_from(&path).unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_invalid_file_reports_path() {
        let dir = std::env::temp_dir().join(format!("rpt-console-bad-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = Settings::load_from(&path).unwrap_err();
        std::fs::remove_dir_all(&dir).unwrap();

        assert!(matches!(err, SettingsError::Parse { .. }));
        assert!(err.to_string().contains("settings.json"));
    }
}
