//! Configuration management for tethercam
//!
//! Provides loading, saving and validation of the runtime options that
//! shape discovery, capture and event draining.

use crate::driver::CameraFilePath;
use crate::errors::CameraError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TetherConfig {
    pub capture: CaptureConfig,
    pub discovery: DiscoveryConfig,
    pub events: EventConfig,
}

/// Still-image capture configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Folder requested for the device-side temporary file
    pub temp_folder: String,
    /// Name requested for the device-side temporary file
    pub temp_name: String,
    /// Base filename; the extension is filled in from the MIME type
    pub base_filename: String,
}

/// Device discovery configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Generic fallback port entries that never name a distinguishable device
    pub excluded_ports: Vec<String>,
}

/// Event draining configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventConfig {
    /// Upper bound on events consumed by one drain call
    pub max_events_per_drain: u32,
}

impl Default for TetherConfig {
    fn default() -> Self {
        Self {
            capture: CaptureConfig {
                temp_folder: "/".to_string(),
                temp_name: "web-gphoto2".to_string(),
                base_filename: "image.".to_string(),
            },
            discovery: DiscoveryConfig {
                excluded_ports: vec!["usb:".to_string()],
            },
            events: EventConfig {
                max_events_per_drain: 1024,
            },
        }
    }
}

impl CaptureConfig {
    /// Path requested from the device for the temporary capture file.
    pub fn temp_path(&self) -> CameraFilePath {
        CameraFilePath::new(self.temp_folder.clone(), self.temp_name.clone())
    }
}

impl TetherConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, CameraError> {
        let path = path.as_ref();

        if !path.exists() {
            log::info!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| CameraError::Config(format!("Failed to read config file: {}", e)))?;

        let config: TetherConfig = toml::from_str(&contents)
            .map_err(|e| CameraError::Config(format!("Failed to parse config file: {}", e)))?;

        config.validate().map_err(CameraError::Config)?;

        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), CameraError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                CameraError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| CameraError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, toml_string)
            .map_err(|e| CameraError::Config(format!("Failed to write config file: {}", e)))?;

        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Get default config file path
    pub fn default_path() -> PathBuf {
        PathBuf::from("tethercam.toml")
    }

    /// Load from default location or fall back to defaults
    pub fn load_or_default() -> Self {
        Self::load_from_file(Self::default_path()).unwrap_or_else(|e| {
            log::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.capture.temp_folder.is_empty() || !self.capture.temp_folder.starts_with('/') {
            return Err("Capture temp folder must be an absolute device path".to_string());
        }
        if self.capture.temp_name.is_empty() || self.capture.temp_name.contains('/') {
            return Err("Capture temp name must be a plain, non-empty file name".to_string());
        }
        if self.capture.base_filename.is_empty() {
            return Err("Capture base filename must not be empty".to_string());
        }

        if self.events.max_events_per_drain == 0 {
            return Err("max_events_per_drain must be at least 1".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TetherConfig::default();
        assert_eq!(
            config.capture.temp_path(),
            CameraFilePath::new("/", "web-gphoto2")
        );
        assert_eq!(config.capture.base_filename, "image.");
        assert_eq!(config.discovery.excluded_ports, vec!["usb:".to_string()]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut bad_folder = TetherConfig::default();
        bad_folder.capture.temp_folder = "relative".to_string();
        assert!(bad_folder.validate().is_err());

        let mut bad_name = TetherConfig::default();
        bad_name.capture.temp_name = "a/b".to_string();
        assert!(bad_name.validate().is_err());

        let mut bad_events = TetherConfig::default();
        bad_events.events.max_events_per_drain = 0;
        assert!(bad_events.validate().is_err());
    }

    #[test]
    fn test_config_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("nested").join("tethercam.toml");

        let mut config = TetherConfig::default();
        config.events.max_events_per_drain = 16;
        config.discovery.excluded_ports.push("serial:".to_string());
        assert!(config.save_to_file(&config_path).is_ok());

        let loaded = TetherConfig::load_from_file(&config_path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_toml_format() {
        let config = TetherConfig::default();
        let toml_string = toml::to_string_pretty(&config).unwrap();

        assert!(toml_string.contains("[capture]"));
        assert!(toml_string.contains("[discovery]"));
        assert!(toml_string.contains("[events]"));
        assert!(toml_string.contains("temp_name"));
    }

    #[test]
    fn test_load_invalid_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("broken.toml");
        fs::write(&config_path, "[capture\ntemp_name = ").unwrap();

        let result = TetherConfig::load_from_file(&config_path);
        assert!(matches!(result, Err(CameraError::Config(_))));
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = TetherConfig::load_from_file("nonexistent_file.toml");
        assert_eq!(result.unwrap(), TetherConfig::default());
    }
}
