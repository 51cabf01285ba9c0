//! Path management for threadline files.
//!
//! Paths are resolved through `AppPaths` from the version-migrate crate so
//! they follow platform conventions (XDG on Linux/macOS, the usual
//! locations on Windows).

use std::path::PathBuf;
use version_migrate::AppPaths;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for threadline_core::ThreadlineError {
    fn from(err: PathError) -> Self {
        Self::Config(err.to_string())
    }
}

/// Path layout.
///
/// ```text
/// ~/.config/threadline/        # Config directory
/// └── config.toml              # Application configuration
///
/// ~/.local/share/threadline/   # Data directory
/// └── storage/                 # Durable blob store
///     ├── chat-storage.json    # Thread snapshot
///     └── token.json           # Remembered session token
/// ```
pub struct ThreadlinePaths;

impl ThreadlinePaths {
    fn app_paths() -> AppPaths {
        AppPaths::new("threadline")
    }

    /// Returns the configuration directory (e.g. `~/.config/threadline/`).
    pub fn config_dir() -> Result<PathBuf, PathError> {
        Self::app_paths()
            .config_dir()
            .map_err(|_| PathError::HomeDirNotFound)
    }

    /// Returns the data directory (e.g. `~/.local/share/threadline/`).
    pub fn data_dir() -> Result<PathBuf, PathError> {
        Self::app_paths()
            .data_dir()
            .map_err(|_| PathError::HomeDirNotFound)
    }

    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Directory backing the durable blob store.
    pub fn storage_dir() -> Result<PathBuf, PathError> {
        Ok(Self::data_dir()?.join("storage"))
    }
}
