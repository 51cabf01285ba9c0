//! Directory-backed blob store with atomic writes.
//!
//! Each key is one file (`{dir}/{key}.json`). Writes go to a temporary
//! file in the same directory which is fsynced and renamed over the
//! target, under an exclusive lock on `{dir}/{key}.lock`. The lock file
//! is never deleted, so every writer locks the same inode.

use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};
use threadline_core::error::{Result, ThreadlineError};
use threadline_core::storage::BlobStore;

/// Blob store persisting each key as a file in a directory.
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    dir: PathBuf,
}

impl FileBlobStore {
    /// Creates a store rooted at `dir`. The directory is created lazily on
    /// first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Maps a key to its file, rejecting keys that could escape the directory.
    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !valid {
            return Err(ThreadlineError::invalid_input(format!(
                "Invalid storage key '{}'",
                key
            )));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }

    fn temp_path(path: &Path) -> Result<PathBuf> {
        let parent = path
            .parent()
            .ok_or_else(|| ThreadlineError::io("Path has no parent directory"))?;
        let file_name = path
            .file_name()
            .ok_or_else(|| ThreadlineError::io("Path has no file name"))?;
        Ok(parent.join(format!(".{}.tmp", file_name.to_string_lossy())))
    }
}

impl BlobStore for FileBlobStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)?;
        if content.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(content))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;

        let _lock = FileLock::acquire(&path)?;

        let tmp_path = Self::temp_path(&path)?;
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(value.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &path)?;
        tracing::debug!("[FileBlobStore] Wrote {:?}", path);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Exclusive lock held for the duration of a write; released on drop.
struct FileLock {
    #[cfg_attr(not(unix), allow(dead_code))]
    file: File,
}

impl FileLock {
    fn acquire(path: &Path) -> Result<Self> {
        let lock_path = path.with_extension("lock");

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        #[cfg(unix)]
        {
            use fs2::FileExt;
            file.lock_exclusive().map_err(|e| {
                ThreadlineError::data_access(format!("Failed to acquire lock: {}", e))
            })?;
        }

        Ok(FileLock { file })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // Closing the handle also unlocks; the file stays for the next writer.
        #[cfg(unix)]
        {
            if let Err(e) = fs2::FileExt::unlock(&self.file) {
                tracing::warn!("[FileBlobStore] Failed to release lock: {}", e);
            }
        }
    }
}
