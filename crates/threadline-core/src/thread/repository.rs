//! Snapshot repository trait.
//!
//! Defines the interface the store uses to persist and restore its
//! thread collection.

use super::model::ThreadSnapshot;
use crate::error::Result;

/// An abstract repository for the persisted thread snapshot.
///
/// Calls are synchronous: the store saves right after each mutation of
/// its collection and must not suspend while doing so.
///
/// # Implementation Notes
///
/// Implementations should handle:
/// - Snapshot versioning and migrations
/// - Treating a missing snapshot as `Ok(None)`, not as an error
pub trait SnapshotRepository: Send + Sync {
    /// Loads the last saved snapshot.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(snapshot))`: A snapshot was found and decoded
    /// - `Ok(None)`: Nothing has been saved yet
    /// - `Err(_)`: The stored snapshot is unreadable or malformed
    fn load(&self) -> Result<Option<ThreadSnapshot>>;

    /// Replaces the stored snapshot.
    fn save(&self, snapshot: &ThreadSnapshot) -> Result<()>;

    /// Deletes the stored snapshot (or does nothing if absent).
    fn clear(&self) -> Result<()>;
}
