//! Configuration for SlideKit
//!
//! Configuration is stored as JSON or TOML (chosen by file extension) in
//! the platform config directory. Sections:
//! - Measurement policy and display preferences
//! - Logging filter

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use slidekit_core::MeasurementUnit;

use crate::error::{SettingsError, SettingsResult};

/// Application directory name under the platform config dir
pub const APP_DIR_NAME: &str = "slidekit";

/// Default config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Measurement settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasurementSettings {
    /// Clinical sign-out context: slides with unknown scale cannot be measured
    pub diagnostic_mode: bool,
    /// Unit new measurements are displayed in
    pub display_unit: MeasurementUnit,
    /// Fewest vertices a polygon needs before it can be saved
    pub min_polygon_vertices: usize,
    /// Log a warning when a measurement is saved under an unvalidated scale
    pub warn_on_unreliable: bool,
}

impl Default for MeasurementSettings {
    fn default() -> Self {
        Self {
            diagnostic_mode: true,
            display_unit: MeasurementUnit::Um,
            min_polygon_vertices: 3,
            warn_on_unreliable: true,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `tracing_subscriber::EnvFilter` directive, overridden by `RUST_LOG`
    pub filter: String,
    /// Emit one JSON object per event instead of pretty text
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Measurement settings
    pub measurement: MeasurementSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

#[derive(Clone, Copy)]
enum Format {
    Json,
    Toml,
}

fn format_for(path: &Path) -> SettingsResult<Format> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("toml") => Ok(Format::Toml),
        other => Err(SettingsError::UnsupportedFormat(
            other.unwrap_or("<none>").to_string(),
        )),
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Default config location, e.g. `~/.config/slidekit/config.toml`
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
            .ok_or_else(|| {
                SettingsError::ConfigDirectory("no platform config directory".to_string())
            })
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = format_for(path)?;
        let content = std::fs::read_to_string(path)?;

        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load config from `path`, falling back to defaults when it does not exist
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::info!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML), creating parent directories
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;
        let format = format_for(path)?;

        let content = match format {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        tracing::debug!("Saved config to {}", path.display());
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        if self.measurement.min_polygon_vertices < 3 {
            return Err(SettingsError::InvalidSetting {
                key: "measurement.min_polygon_vertices".to_string(),
                reason: "must be at least 3".to_string(),
            });
        }

        if self.logging.filter.trim().is_empty() {
            return Err(SettingsError::InvalidSetting {
                key: "logging.filter".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_safe() {
        let config = Config::default();
        assert!(config.measurement.diagnostic_mode);
        assert_eq!(config.measurement.display_unit, MeasurementUnit::Um);
        assert_eq!(config.measurement.min_polygon_vertices, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_small_polygon_minimum() {
        let mut config = Config::default();
        config.measurement.min_polygon_vertices = 2;
        assert!(matches!(
            config.validate(),
            Err(SettingsError::InvalidSetting { .. })
        ));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str("[measurement]\ndisplay_unit = \"mm\"\n").unwrap();
        assert_eq!(config.measurement.display_unit, MeasurementUnit::Mm);
        assert!(config.measurement.diagnostic_mode);
        assert_eq!(config.logging.filter, "info");
        assert!(!config.logging.json);
    }

    #[test]
    fn test_json_logging_flag() {
        let config: Config =
            toml::from_str("[logging]\nfilter = \"slidekit=debug\"\njson = true\n").unwrap();
        assert!(config.logging.json);
        assert_eq!(config.logging.filter, "slidekit=debug");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unsupported_extension() {
        let err = Config::default()
            .save_to_file(Path::new("config.yaml"))
            .unwrap_err();
        assert!(matches!(err, SettingsError::UnsupportedFormat(ref ext) if ext == "yaml"));
    }
}
