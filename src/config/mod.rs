//! Configuration loading and management

use crate::core::error::ConfigError;
use crate::core::product::DEFAULT_DATE_FORMAT;
use serde::{Deserialize, Serialize};

/// Rules used to build the validation engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// `chrono` format of the calendar date fields
    pub date_format: String,

    /// Maximum number of characters of the lot codes
    pub max_text_length: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            max_text_length: 100,
        }
    }
}

/// Behaviour of the QR viewer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Also fetch the full record behind the QR hash
    pub fetch_detail: bool,

    /// First segment of the download file name
    pub download_prefix: String,

    /// Last segment of the download file name, before the extension
    pub download_suffix: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            fetch_detail: true,
            download_prefix: "QR".to_string(),
            download_suffix: "producto".to_string(),
        }
    }
}

/// Complete configuration of the editor core
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub validation: ValidationConfig,
    pub viewer: ViewerConfig,
}

impl EditorConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    ///
    /// Missing sections and keys fall back to their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        tracing::debug!(
            date_format = %config.validation.date_format,
            fetch_detail = config.viewer.fetch_detail,
            "Loaded editor configuration"
        );
        Ok(config)
    }

    /// Create a default configuration for testing
    pub fn default_config() -> Self {
        Self::default()
    }
}
