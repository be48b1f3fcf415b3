//! Loader and pack configuration read from RON, TOML or JSON files.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::format::{DataLoadError, deserialize_file};
use crate::multi_json::{JSON_SUFFIX, MultiJsonLoader};
use crate::pack_dir::PackStack;

fn default_suffix() -> String {
    JSON_SUFFIX.to_string()
}

/// Configuration for one [`MultiJsonLoader`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Directory under each namespace to scan, e.g. `powers`.
    pub resource_type: String,
    #[serde(default = "default_suffix")]
    pub suffix: String,
}

impl LoaderConfig {
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            suffix: default_suffix(),
        }
    }

    pub fn validate(&self) -> Result<(), DataLoadError> {
        let resource_type = self.resource_type.trim_matches('/');
        if resource_type.is_empty() {
            return Err(DataLoadError::InvalidConfig {
                detail: "loader resource_type must not be empty".to_string(),
            });
        }
        if resource_type != self.resource_type {
            return Err(DataLoadError::InvalidConfig {
                detail: format!(
                    "loader resource_type '{}' must not start or end with '/'",
                    self.resource_type
                ),
            });
        }
        Ok(())
    }

    /// Build a loader using the default strict JSON parser.
    pub fn build(&self) -> MultiJsonLoader {
        MultiJsonLoader::new(self.resource_type.as_str()).with_suffix(self.suffix.as_str())
    }
}

/// A pack entry in a merge configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackEntry {
    pub name: String,
    pub path: PathBuf,
}

/// Packs to overlay and loaders to run over them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeConfig {
    #[serde(default)]
    pub packs: Vec<PackEntry>,
    #[serde(default)]
    pub loaders: Vec<LoaderConfig>,
}

impl MergeConfig {
    pub fn validate(&self) -> Result<(), DataLoadError> {
        for pack in &self.packs {
            if pack.name.is_empty() {
                return Err(DataLoadError::InvalidConfig {
                    detail: format!("pack at {} has an empty name", pack.path.display()),
                });
            }
        }
        self.loaders.iter().try_for_each(LoaderConfig::validate)
    }

    /// Build a [`PackStack`] from the configured packs, in order.
    pub fn pack_stack(&self) -> Result<PackStack, DataLoadError> {
        let mut stack = PackStack::new();
        for pack in &self.packs {
            stack.push(pack.name.as_str(), pack.path.as_path())?;
        }
        Ok(stack)
    }
}

/// Load and validate a merge configuration.
///
/// Relative pack paths are resolved against the directory containing the
/// configuration file.
pub fn load_merge_config(path: &Path) -> Result<MergeConfig, DataLoadError> {
    let mut config: MergeConfig = deserialize_file(path)?;

    let base = path.parent().unwrap_or_else(|| Path::new(""));
    for pack in &mut config.packs {
        if pack.path.is_relative() {
            pack.path = base.join(&pack.path);
        }
    }

    config.validate()?;
    Ok(config)
}
