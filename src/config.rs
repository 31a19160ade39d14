// src/config.rs

//! Runtime configuration for pcurate
//!
//! The configuration is resolved once at startup and handed to the store,
//! the filter loader and the request executor. Nothing below reads the
//! environment after that point.
//!
//! An optional `config.toml` in the configuration directory may override:
//!
//! ```toml
//! store_file = "pcurate.db"
//! filter_file = "filter.txt"
//! filtered_curated = "prune"   # or "keep"
//! ```

use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory name under the user's config directory
pub const APP_DIR_NAME: &str = "pcurate";

/// Default store file name
pub const DEFAULT_STORE_FILE: &str = "pcurate.db";

/// Default filter rule file name
pub const DEFAULT_FILTER_FILE: &str = "filter.txt";

/// Optional settings file name
pub const SETTINGS_FILE: &str = "config.toml";

/// What to do with a curated record whose name matches a filter rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilteredCuratedPolicy {
    /// Drop the record from the store and from output
    #[default]
    Prune,
    /// Keep the record and keep showing it as curated
    Keep,
}

/// Resolved configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub config_dir: PathBuf,
    pub store_path: PathBuf,
    pub filter_path: PathBuf,
    pub filtered_curated: FilteredCuratedPolicy,
}

#[derive(Debug, Default, Deserialize)]
struct Settings {
    store_file: Option<PathBuf>,
    filter_file: Option<PathBuf>,
    filtered_curated: Option<FilteredCuratedPolicy>,
}

impl Config {
    /// Default configuration rooted at `config_dir`, ignoring any settings file
    pub fn in_dir(config_dir: impl Into<PathBuf>) -> Self {
        let config_dir = config_dir.into();
        Self {
            store_path: config_dir.join(DEFAULT_STORE_FILE),
            filter_path: config_dir.join(DEFAULT_FILTER_FILE),
            filtered_curated: FilteredCuratedPolicy::default(),
            config_dir,
        }
    }

    /// Resolve the configuration
    ///
    /// Uses `config_dir` when given, otherwise `$XDG_CONFIG_HOME/pcurate`
    /// (falling back to `$HOME/.config/pcurate`). A `config.toml` in that
    /// directory is applied on top of the defaults.
    pub fn resolve(config_dir: Option<PathBuf>) -> Result<Self> {
        let config_dir = match config_dir {
            Some(dir) => dir,
            None => dirs::config_dir()
                .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?
                .join(APP_DIR_NAME),
        };

        let mut config = Self::in_dir(config_dir);
        let settings_path = config.config_dir.join(SETTINGS_FILE);
        if settings_path.is_file() {
            debug!("Loading settings from {}", settings_path.display());
            let settings = read_settings(&settings_path)?;
            config.apply(settings);
        }

        Ok(config)
    }

    fn apply(&mut self, settings: Settings) {
        if let Some(store_file) = settings.store_file {
            self.store_path = self.config_dir.join(store_file);
        }
        if let Some(filter_file) = settings.filter_file {
            self.filter_path = self.config_dir.join(filter_file);
        }
        if let Some(policy) = settings.filtered_curated {
            self.filtered_curated = policy;
        }
    }
}

fn read_settings(path: &Path) -> Result<Settings> {
    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Invalid {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_in_dir() {
        let config = Config::in_dir("/tmp/pcurate-test");
        assert_eq!(config.store_path, Path::new("/tmp/pcurate-test/pcurate.db"));
        assert_eq!(config.filter_path, Path::new("/tmp/pcurate-test/filter.txt"));
        assert_eq!(config.filtered_curated, FilteredCuratedPolicy::Prune);
    }

    #[test]
    fn test_resolve_without_settings_file() {
        let dir = tempdir().unwrap();
        let config = Config::resolve(Some(dir.path().to_path_buf())).unwrap();
        assert_eq!(config, Config::in_dir(dir.path()));
    }

    #[test]
    fn test_resolve_applies_settings() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(SETTINGS_FILE),
            "filter_file = \"rules/ignore.txt\"\nfiltered_curated = \"keep\"\nunknown = 3\n",
        )
        .unwrap();

        let config = Config::resolve(Some(dir.path().to_path_buf())).unwrap();
        assert_eq!(config.filter_path, dir.path().join("rules/ignore.txt"));
        assert_eq!(config.store_path, dir.path().join(DEFAULT_STORE_FILE));
        assert_eq!(config.filtered_curated, FilteredCuratedPolicy::Keep);
    }

    #[test]
    fn test_resolve_rejects_bad_settings() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(SETTINGS_FILE), "filtered_curated = \"sometimes\"\n").unwrap();

        let result = Config::resolve(Some(dir.path().to_path_buf()));
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
