//! Blob-backed SnapshotRepository implementation.
//!
//! The snapshot is stored as flat versioned JSON under a fixed key:
//!
//! ```text
//! chat-storage = {"version":"1.0.0","threads":[...]}
//! ```

use std::sync::Arc;
use version_migrate::Migrator;

use threadline_core::error::{Result, ThreadlineError};
use threadline_core::storage::BlobStore;
use threadline_core::thread::{SnapshotRepository, ThreadSnapshot};

use crate::dto::{THREAD_SNAPSHOT_ENTITY, create_thread_snapshot_migrator};

/// Snapshot repository writing through a [`BlobStore`].
pub struct BlobSnapshotRepository {
    store: Arc<dyn BlobStore>,
    /// Migrator for version handling.
    migrator: Migrator,
}

impl BlobSnapshotRepository {
    /// Key the snapshot lives under.
    pub const STORAGE_KEY: &'static str = "chat-storage";

    pub fn new(store: Arc<dyn BlobStore>) -> Result<Self> {
        Ok(Self {
            store,
            migrator: create_thread_snapshot_migrator()?,
        })
    }
}

impl SnapshotRepository for BlobSnapshotRepository {
    fn load(&self) -> Result<Option<ThreadSnapshot>> {
        let Some(content) = self.store.get(Self::STORAGE_KEY)? else {
            return Ok(None);
        };

        // Parse JSON and migrate to latest version
        let json_value: serde_json::Value = serde_json::from_str(&content)?;

        let snapshot: ThreadSnapshot = self
            .migrator
            .load_flat_from(THREAD_SNAPSHOT_ENTITY, json_value)
            .map_err(|e| {
                ThreadlineError::migration(format!("Failed to migrate thread snapshot: {}", e))
            })?;

        Ok(Some(snapshot))
    }

    fn save(&self, snapshot: &ThreadSnapshot) -> Result<()> {
        // Serialize using migrator (includes version info)
        let serialized = self
            .migrator
            .save_domain_flat(THREAD_SNAPSHOT_ENTITY, snapshot.clone())
            .map_err(|e| {
                ThreadlineError::migration(format!("Failed to serialize thread snapshot: {}", e))
            })?;

        self.store.set(Self::STORAGE_KEY, &serialized)
    }

    fn clear(&self) -> Result<()> {
        self.store.remove(Self::STORAGE_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileBlobStore, MemoryBlobStore};
    use tempfile::TempDir;
    use threadline_core::thread::{Message, Thread, ThreadStore};

    fn repository() -> (BlobSnapshotRepository, Arc<MemoryBlobStore>) {
        let blobs = Arc::new(MemoryBlobStore::new());
        (BlobSnapshotRepository::new(blobs.clone()).unwrap(), blobs)
    }

    #[test]
    fn test_load_without_snapshot_is_none() {
        let (repo, _) = repository();
        assert_eq!(repo.load().unwrap(), None);
    }

    #[test]
    fn test_save_and_load_preserves_order_and_content() {
        let (repo, _) = repository();
        let first = Thread::start("user-1", "first");
        let second = Thread::start("user-1", "second");
        let first = first.with_message(Message::assistant(first.id.clone(), "reply"));
        let snapshot = ThreadSnapshot::new(vec![second, first]);

        repo.save(&snapshot).unwrap();

        assert_eq!(repo.load().unwrap(), Some(snapshot));
    }

    #[test]
    fn test_stored_blob_is_versioned() {
        let (repo, blobs) = repository();
        repo.save(&ThreadSnapshot::default()).unwrap();

        let raw = blobs
            .get(BlobSnapshotRepository::STORAGE_KEY)
            .unwrap()
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["version"], "1.0.0");
    }

    #[test]
    fn test_malformed_blob_is_an_error() {
        let (repo, blobs) = repository();
        blobs
            .set(BlobSnapshotRepository::STORAGE_KEY, "{not json")
            .unwrap();
        assert!(repo.load().is_err());

        blobs
            .set(
                BlobSnapshotRepository::STORAGE_KEY,
                r#"{"version":"1.0.0","threads":"oops"}"#,
            )
            .unwrap();
        assert!(repo.load().is_err());
    }

    #[test]
    fn test_clear_removes_snapshot() {
        let (repo, _) = repository();
        repo.save(&ThreadSnapshot::default()).unwrap();
        repo.clear().unwrap();
        assert_eq!(repo.load().unwrap(), None);
    }

    #[test]
    fn test_store_restores_from_file_backed_snapshot() {
        let temp_dir = TempDir::new().unwrap();
        let open = || {
            let blobs = Arc::new(FileBlobStore::new(temp_dir.path()));
            Arc::new(BlobSnapshotRepository::new(blobs).unwrap())
        };

        let store = ThreadStore::new(open());
        let thread = Thread::start("user-1", "persist me");
        store.prepend(thread.clone());
        store.append_message(&thread.id, Message::assistant(thread.id.clone(), "ok"));
        let expected = store.threads();
        drop(store);

        let restored = ThreadStore::new(open());
        assert_eq!(restored.threads(), expected);
    }

    #[test]
    fn test_store_ignores_corrupt_file_snapshot() {
        let temp_dir = TempDir::new().unwrap();
        let blobs = Arc::new(FileBlobStore::new(temp_dir.path()));
        blobs
            .set(BlobSnapshotRepository::STORAGE_KEY, "garbage")
            .unwrap();

        let store = ThreadStore::new(Arc::new(BlobSnapshotRepository::new(blobs).unwrap()));
        assert!(store.is_empty());
    }

    fn store_over(blob: &str) -> ThreadStore {
        let (repo, blobs) = repository();
        blobs.set(BlobSnapshotRepository::STORAGE_KEY, blob).unwrap();
        ThreadStore::new(Arc::new(repo))
    }

    #[test]
    fn test_store_rejects_snapshot_thread_without_messages() {
        let missing = store_over(
            r#"{"version":"1.0.0","threads":[{"id":"T1","userId":"u","title":"t","createdAt":"x"}]}"#,
        );
        assert!(missing.is_empty());

        let empty = store_over(
            r#"{"version":"1.0.0","threads":[{"id":"T1","userId":"u","title":"t","createdAt":"x","message":[]}]}"#,
        );
        assert!(empty.find("T1").is_none());
        assert!(empty.is_empty());
    }

    #[test]
    fn test_store_drops_snapshot_thread_with_foreign_message() {
        let store = store_over(
            r#"{"version":"1.0.0","threads":[
                {"id":"T1","userId":"u","title":"t","createdAt":"x","message":[
                    {"id":"m1","threadId":"T2","content":"hi","role":"user","createdAt":"x"}
                ]},
                {"id":"T3","userId":"u","title":"t","createdAt":"x","message":[
                    {"id":"m2","threadId":"T3","content":"hello","role":"user","createdAt":"x"}
                ]}
            ]}"#,
        );

        assert!(store.find("T1").is_none());
        assert_eq!(store.find("T3").map(|t| t.message_count()), Some(1));
    }
}
