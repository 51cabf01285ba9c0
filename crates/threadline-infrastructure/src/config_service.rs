//! Configuration service implementation.
//!
//! Loads [`AppConfig`] from `config.toml` in the configuration directory.

use crate::paths::ThreadlinePaths;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use threadline_core::config::AppConfig;
use threadline_core::error::Result;

/// Configuration service that loads and caches the application config.
///
/// A missing file yields the defaults. A file that exists but cannot be
/// parsed is an error rather than silently ignored.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    /// Cached configuration, filled on first access.
    config: Arc<RwLock<Option<AppConfig>>>,
}

impl ConfigService {
    /// Creates a ConfigService reading the default `config.toml`.
    pub fn new() -> Result<Self> {
        Ok(Self::with_path(ThreadlinePaths::config_file()?))
    }

    /// Creates a ConfigService reading a custom path (for testing).
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets the configuration, loading from file if not cached.
    pub fn get_config(&self) -> Result<AppConfig> {
        {
            let cached = self.config.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(ref config) = *cached {
                return Ok(config.clone());
            }
        }

        let loaded = Self::load_config(&self.path)?;

        let mut cached = self.config.write().unwrap_or_else(PoisonError::into_inner);
        *cached = Some(loaded.clone());
        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut cached = self.config.write().unwrap_or_else(PoisonError::into_inner);
        *cached = None;
    }

    fn load_config(path: &Path) -> Result<AppConfig> {
        if !path.exists() {
            tracing::debug!("[ConfigService] No config at {:?}, using defaults", path);
            return Ok(AppConfig::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        tracing::debug!("[ConfigService] Loaded config from {:?}", path);
        Ok(config)
    }
}
