//! Configuration for the pipeline engine
//!
//! # Data Location
//!
//! The engine configuration is stored in the platform-appropriate location:
//! - **Linux**: `~/.local/share/analitico-pipeline/`
//! - **macOS**: `~/Library/Application Support/analitico-pipeline/`
//! - **Windows**: `%APPDATA%\analitico-pipeline\`
//!
//! # Files
//!
//! - `engine.toml` - source marker, autosave delay, log directory and
//!   placement rules
//!
//! # Example
//!
//! ```ignore
//! use analitico_pipeline::config::EngineConfig;
//!
//! let config = EngineConfig::load_or_default();
//! let env = PipelineEnvironment::from_config(&config);
//! ```

pub mod placement;

pub use placement::{PlacementConfig, PlacementRule};

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier for data directories
pub const APP_ID: &str = "analitico-pipeline";

/// Engine configuration filename
pub const CONFIG_FILE: &str = "engine.toml";

/// Name segment that marks a plugin as a data source
pub const DEFAULT_SOURCE_MARKER: &str = "SourcePlugin";

/// Save-after-idle delay in milliseconds
pub const DEFAULT_AUTOSAVE_IDLE_MS: u64 = 3000;

// ==================== App Data Directory ====================

/// Get the application data directory path
pub fn app_data_dir() -> Option<PathBuf> {
    dirs_next::data_dir().map(|p| p.join(APP_ID))
}

/// Ensure the app data directory exists
pub fn ensure_app_data_dir() -> Result<PathBuf> {
    let dir = app_data_dir().ok_or_else(|| {
        PipelineError::Config("Could not determine app data directory".to_string())
    })?;

    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| {
            PipelineError::Config(format!("Failed to create app data directory: {}", e))
        })?;
    }

    Ok(dir)
}

/// Get the path to the engine configuration file
pub fn config_path() -> Option<PathBuf> {
    app_data_dir().map(|p| p.join(CONFIG_FILE))
}

// ==================== Engine Config ====================

/// Engine-wide settings shared by every pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Substring of a symbolic name that marks a source plugin
    #[serde(default = "default_source_marker")]
    pub source_marker: String,

    /// Idle time after the last change before the owner saves
    #[serde(default = "default_autosave_idle_ms")]
    pub autosave_idle_ms: u64,

    /// Directory for rolling log files, if file logging is wanted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,

    /// Placement rule per pipeline class
    #[serde(default)]
    pub placement: PlacementConfig,
}

fn default_source_marker() -> String {
    DEFAULT_SOURCE_MARKER.to_string()
}

fn default_autosave_idle_ms() -> u64 {
    DEFAULT_AUTOSAVE_IDLE_MS
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            source_marker: default_source_marker(),
            autosave_idle_ms: DEFAULT_AUTOSAVE_IDLE_MS,
            log_dir: None,
            placement: PlacementConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load the configuration from the default location
    pub fn load() -> Result<Self> {
        let path = config_path().ok_or_else(|| {
            PipelineError::Config("Could not determine config path".to_string())
        })?;

        if !path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load the configuration, returning defaults on any error
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!("Failed to load engine config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Load the configuration from a specific file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save the configuration to the default location
    pub fn save(&self) -> Result<()> {
        let dir = ensure_app_data_dir()?;
        self.save_to(dir.join(CONFIG_FILE))
    }

    /// Save the configuration to a specific file
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), content).map_err(|e| {
            PipelineError::Config(format!(
                "Failed to write {}: {}",
                path.as_ref().display(),
                e
            ))
        })
    }

    /// Reject settings the engine cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.source_marker.is_empty() {
            return Err(PipelineError::Config(
                "source_marker cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn autosave_idle(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.autosave_idle_ms)
    }
}
