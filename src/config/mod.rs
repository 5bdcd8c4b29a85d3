//! Report configuration
//!
//! Layers, lowest precedence first:
//! 1. Built-in defaults
//! 2. Config file (`.xcreport.toml` or `--config`)
//! 3. CLI flags
//!
//! Layers are merged as JSON values and then deserialized, so a file only has
//! to name the keys it changes.

mod defaults;
mod merge;

pub use defaults::{
    DEFAULT_DATA_DIR, DEFAULT_DOWNSIZE_SCALE_FACTOR, DEFAULT_PRESERVED_FILES,
};
pub use merge::{merge_layers, overlay};

use std::fs;
use std::io;
use std::path::{Component, Path};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use xcreport_model::RenderingMode;

/// Errors loading or validating configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Deserialize(#[from] serde_json::Error),

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Settings passed through unchanged to the per-target summary builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderingConfig {
    /// Whether logs and attachments are embedded or linked
    #[serde(default)]
    pub rendering_mode: RenderingMode,

    /// Shrink screenshots before embedding them
    #[serde(default)]
    pub downsize_images_enabled: bool,

    /// Scale applied when shrinking, in (0, 1]
    #[serde(default = "defaults::downsize_scale_factor")]
    pub downsize_scale_factor: f64,
}

impl Default for RenderingConfig {
    fn default() -> Self {
        Self {
            rendering_mode: RenderingMode::default(),
            downsize_images_enabled: false,
            downsize_scale_factor: DEFAULT_DOWNSIZE_SCALE_FACTOR,
        }
    }
}

/// Layout and allow-list used when removing unattached files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Name of the nested attachment directory inside a bundle
    #[serde(default = "defaults::data_dir_name")]
    pub data_dir_name: String,

    /// File names that are never removed
    #[serde(default = "defaults::preserved_files")]
    pub preserved_files: Vec<String>,

    /// Count candidates without removing them
    #[serde(default)]
    pub dry_run: bool,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            data_dir_name: DEFAULT_DATA_DIR.to_string(),
            preserved_files: DEFAULT_PRESERVED_FILES.iter().map(|s| s.to_string()).collect(),
            dry_run: false,
        }
    }
}

impl CollectorConfig {
    /// Add a file name to the allow-list.
    pub fn preserve(mut self, file_name: impl Into<String>) -> Self {
        let file_name = file_name.into();
        if !self.preserved_files.contains(&file_name) {
            self.preserved_files.push(file_name);
        }
        self
    }

    pub fn with_dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }
}

/// Complete configuration for one report session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub rendering: RenderingConfig,

    #[serde(default)]
    pub collector: CollectorConfig,

    /// Summary-building threads; twice the logical core count when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_threads: Option<usize>,
}

impl ReportConfig {
    /// Config file looked up in the working directory.
    pub const DEFAULT_FILE: &'static str = ".xcreport.toml";

    /// Build the effective configuration from an optional file and CLI overrides.
    ///
    /// `cli` is a JSON object holding only the keys set on the command line.
    pub fn load(file: Option<&Path>, cli: Value) -> Result<Self, ConfigError> {
        let mut layers = vec![serde_json::to_value(Self::default())?];
        if let Some(path) = file {
            layers.push(Self::read_file_layer(path)?);
        }
        layers.push(cli);

        let config: ReportConfig = serde_json::from_value(merge_layers(layers))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML config file into a merge layer.
    pub fn read_file_layer(path: &Path) -> Result<Value, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse_layer(&content)
    }

    /// Parse TOML text into a merge layer.
    pub fn parse_layer(content: &str) -> Result<Value, ConfigError> {
        let table: toml::Value = toml::from_str(content)?;
        Ok(serde_json::to_value(table)?)
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let scale = self.rendering.downsize_scale_factor;
        if !(scale > 0.0 && scale <= 1.0) {
            return Err(ConfigError::InvalidValue {
                field: "rendering.downsize_scale_factor".to_string(),
                reason: format!("{} is outside (0, 1]", scale),
            });
        }

        if self.worker_threads == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "worker_threads".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let data_dir = Path::new(&self.collector.data_dir_name);
        let mut components = data_dir.components();
        let single_segment = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );
        if !single_segment {
            return Err(ConfigError::InvalidValue {
                field: "collector.data_dir_name".to_string(),
                reason: format!("'{}' is not a single directory name", self.collector.data_dir_name),
            });
        }

        Ok(())
    }
}
