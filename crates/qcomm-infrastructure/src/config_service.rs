//! Configuration service implementation.
//!
//! Loads the simulation configuration from `config.toml`, either at an
//! explicit path or at `~/.config/qcomm/config.toml`.

use crate::paths::QCommPaths;
use qcomm_core::config::SimulationConfig;
use qcomm_core::error::{QCommError, Result};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Configuration service that loads and caches the simulation configuration.
///
/// A missing file is not an error: defaults are used instead. A file that
/// exists but fails to parse or validate is reported.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: Option<PathBuf>,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<SimulationConfig>>>,
}

impl ConfigService {
    /// Creates a service reading from the platform config path.
    pub fn new() -> Self {
        Self {
            path: None,
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Creates a service reading from an explicit file.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Resolved config file location.
    pub fn config_path(&self) -> Result<PathBuf> {
        match &self.path {
            Some(path) => Ok(path.clone()),
            None => QCommPaths::config_file().map_err(|e| QCommError::config(e.to_string())),
        }
    }

    /// Gets the configuration, loading from file if not cached.
    pub fn get_config(&self) -> Result<SimulationConfig> {
        // Check if already cached
        {
            let read_lock = self
                .config
                .read()
                .map_err(|_| QCommError::internal("config cache poisoned"))?;
            if let Some(ref cached) = *read_lock {
                return Ok(cached.clone());
            }
        }

        let loaded = Self::load_from(&self.config_path()?)?;

        {
            let mut write_lock = self
                .config
                .write()
                .map_err(|_| QCommError::internal("config cache poisoned"))?;
            *write_lock = Some(loaded.clone());
        }

        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        if let Ok(mut write_lock) = self.config.write() {
            *write_lock = None;
        }
    }

    /// Reads and validates a config file; a missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<SimulationConfig> {
        if !path.exists() {
            tracing::debug!("[ConfigService] {:?} not found, using defaults", path);
            return Ok(SimulationConfig::default());
        }

        let raw = std::fs::read_to_string(path)?;
        let config: SimulationConfig = toml::from_str(&raw)?;
        config.validate()?;
        tracing::info!("[ConfigService] Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Writes the default configuration to `path`, creating parent directories.
    pub fn save_default(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let rendered = toml::to_string_pretty(&SimulationConfig::default())?;
        std::fs::write(path, rendered)?;
        Ok(())
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let service = ConfigService::with_path(dir.path().join("config.toml"));
        assert_eq!(service.get_config().unwrap(), SimulationConfig::default());
    }

    #[test]
    fn test_save_default_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        ConfigService::save_default(&path).unwrap();
        let loaded = ConfigService::load_from(&path).unwrap();

        assert_eq!(loaded, SimulationConfig::default());
    }

    #[test]
    fn test_invalid_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[repair]\nmax_attempts = 0\n").unwrap();

        let err = ConfigService::with_path(&path).get_config().unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_cache_is_reused_until_invalidated() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "local_sender = \"first\"\n").unwrap();
        let service = ConfigService::with_path(&path);
        assert_eq!(service.get_config().unwrap().local_sender, "first");

        std::fs::write(&path, "local_sender = \"second\"\n").unwrap();
        assert_eq!(service.get_config().unwrap().local_sender, "first");

        service.invalidate_cache();
        assert_eq!(service.get_config().unwrap().local_sender, "second");
    }
}
