//! Key-value blob storage capability.
//!
//! The snapshot and credential layers only ever need get/set/remove of a
//! string under a fixed key, so they are written against this trait rather
//! than a concrete storage mechanism.

use crate::error::Result;

/// A synchronous string-valued key-value store.
pub trait BlobStore: Send + Sync {
    /// Returns the value under `key`, or `None` if nothing is stored.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}
