//! Persistent planner preferences.

use std::{
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::utils::PathResolver;

const TMP_SUFFIX: &str = "tmp";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serde(String),
}

/// Stores user-configurable planning preferences.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlannerConfig {
    pub currency: String,
    /// Days ahead (today included) in which an unallocated debt counts as due soon.
    #[serde(default = "PlannerConfig::default_due_soon_days")]
    pub due_soon_days: u32,
    /// Age after which a cached month is served stale and revalidated.
    #[serde(default = "PlannerConfig::default_cache_stale_after_secs")]
    pub cache_stale_after_secs: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            currency: "USD".into(),
            due_soon_days: Self::default_due_soon_days(),
            cache_stale_after_secs: Self::default_cache_stale_after_secs(),
            data_file: None,
        }
    }
}

impl PlannerConfig {
    pub fn default_due_soon_days() -> u32 {
        7
    }

    pub fn default_cache_stale_after_secs() -> u64 {
        30
    }

    pub fn cache_stale_after(&self) -> Duration {
        Duration::from_secs(self.cache_stale_after_secs)
    }

    pub fn resolve_data_file(&self, base: &Path) -> PathBuf {
        self.data_file
            .clone()
            .unwrap_or_else(|| PathResolver::data_file_in(base))
    }
}

/// Handles persistence for [`PlannerConfig`].
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub fn with_base_dir(base: &Path) -> Result<Self, ConfigError> {
        let config_dir = PathResolver::config_dir_in(base);
        fs::create_dir_all(&config_dir)?;
        Ok(Self::new(PathResolver::config_file_in(base)))
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Loads the stored configuration, falling back to defaults when none exists.
    pub fn load(&self) -> Result<PlannerConfig, ConfigError> {
        if self.config_path.exists() {
            let data = fs::read_to_string(&self.config_path)?;
            serde_json::from_str(&data).map_err(|err| ConfigError::Serde(err.to_string()))
        } else {
            Ok(PlannerConfig::default())
        }
    }

    pub fn save(&self, config: &PlannerConfig) -> Result<(), ConfigError> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(config)
            .map_err(|err| ConfigError::Serde(err.to_string()))?;
        let tmp = tmp_path(&self.config_path);
        write_file(&tmp, &json)?;
        fs::rename(&tmp, &self.config_path)?;
        Ok(())
    }
}

pub(crate) fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

pub(crate) fn write_file(path: &Path, data: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().expect("tempdir");
        let manager = ConfigManager::new(dir.path().join("config.json"));
        let config = manager.load().expect("load defaults");
        assert_eq!(config, PlannerConfig::default());
        assert_eq!(config.due_soon_days, 7);
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = tempdir().expect("tempdir");
        let manager = ConfigManager::with_base_dir(dir.path()).expect("manager");
        let mut config = PlannerConfig::default();
        config.currency = "EUR".into();
        config.due_soon_days = 3;
        manager.save(&config).expect("save");

        assert_eq!(manager.load().expect("load"), config);
        assert!(!tmp_path(manager.config_path()).exists());
    }

    #[test]
    fn partial_files_fill_in_defaults() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "currency": "CAD" }"#).expect("write");
        let config = ConfigManager::new(path).load().expect("load");
        assert_eq!(config.currency, "CAD");
        assert_eq!(config.cache_stale_after_secs, 30);
    }

    #[test]
    fn corrupt_files_report_serde_errors() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").expect("write");
        let err = ConfigManager::new(path).load().expect_err("corrupt config");
        assert!(matches!(err, ConfigError::Serde(_)));
    }
}
