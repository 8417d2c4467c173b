//! Bridge configuration
//!
//! Loaded from a TOML table; every field has a default so an empty file (or
//! no file at all) gives the standard setup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Debug bridge settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Inspector namespace items are listed under (default: "nethercore")
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Minimum time between snapshots of the same model (default: 1000)
    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,
    /// Inspector path for uniform snapshots (default: "objects.uniforms")
    #[serde(default = "default_uniforms_path")]
    pub uniforms_path: String,
    /// Inspector path for attribute snapshots (default: "objects.attributes")
    #[serde(default = "default_attributes_path")]
    pub attributes_path: String,
    /// Forget a model's overrides when it is unregistered (default: true)
    #[serde(default = "default_true")]
    pub prune_overrides_on_remove: bool,
}

fn default_namespace() -> String {
    "nethercore".to_string()
}
fn default_throttle_ms() -> u64 {
    1000
}
fn default_uniforms_path() -> String {
    "objects.uniforms".to_string()
}
fn default_attributes_path() -> String {
    "objects.attributes".to_string()
}
fn default_true() -> bool {
    true
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            throttle_ms: default_throttle_ms(),
            uniforms_path: default_uniforms_path(),
            attributes_path: default_attributes_path(),
            prune_overrides_on_remove: default_true(),
        }
    }
}

/// Errors from loading a bridge config
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read bridge config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid bridge config: {0}")]
    Parse(#[from] toml::de::Error),
}

impl BridgeConfig {
    pub fn throttle_interval(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }

    /// Parse a config from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load a config file
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be read or isn't valid TOML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Load a config file, falling back to defaults on any error
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!("{}, using defaults", err);
                Self::default()
            }
        }
    }
}
