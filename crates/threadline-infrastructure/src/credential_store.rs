//! Two-tier credential store.

use std::sync::Arc;
use threadline_core::auth::{CredentialStore, StorageTier};
use threadline_core::error::Result;
use threadline_core::storage::BlobStore;

/// Keeps the session token in a durable or a session-scoped [`BlobStore`].
///
/// Storing a token into one tier removes it from the other, so there is
/// never a stale token shadowing a newer one.
pub struct TieredCredentialStore {
    durable: Arc<dyn BlobStore>,
    session: Arc<dyn BlobStore>,
}

impl TieredCredentialStore {
    /// Key the token lives under in either tier.
    pub const TOKEN_KEY: &'static str = "token";

    pub fn new(durable: Arc<dyn BlobStore>, session: Arc<dyn BlobStore>) -> Self {
        Self { durable, session }
    }

    fn tier(&self, tier: StorageTier) -> &dyn BlobStore {
        match tier {
            StorageTier::Durable => self.durable.as_ref(),
            StorageTier::Session => self.session.as_ref(),
        }
    }
}

impl CredentialStore for TieredCredentialStore {
    fn store_token(&self, token: &str, tier: StorageTier) -> Result<()> {
        let other = match tier {
            StorageTier::Durable => StorageTier::Session,
            StorageTier::Session => StorageTier::Durable,
        };
        self.tier(other).remove(Self::TOKEN_KEY)?;
        self.tier(tier).set(Self::TOKEN_KEY, token)?;
        tracing::debug!("[TieredCredentialStore] Stored token in {} tier", tier);
        Ok(())
    }

    fn token(&self) -> Result<Option<String>> {
        if let Some(token) = self.durable.get(Self::TOKEN_KEY)? {
            return Ok(Some(token));
        }
        self.session.get(Self::TOKEN_KEY)
    }

    fn clear(&self) -> Result<()> {
        self.durable.remove(Self::TOKEN_KEY)?;
        self.session.remove(Self::TOKEN_KEY)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBlobStore;

    fn store() -> (TieredCredentialStore, Arc<MemoryBlobStore>, Arc<MemoryBlobStore>) {
        let durable = Arc::new(MemoryBlobStore::new());
        let session = Arc::new(MemoryBlobStore::new());
        (
            TieredCredentialStore::new(durable.clone(), session.clone()),
            durable,
            session,
        )
    }

    #[test]
    fn test_remember_selects_durable_tier() {
        let (creds, durable, session) = store();
        creds
            .store_token("mock_token_123", StorageTier::for_remember(true))
            .unwrap();

        assert_eq!(
            durable.get(TieredCredentialStore::TOKEN_KEY).unwrap(),
            Some("mock_token_123".to_string())
        );
        assert_eq!(session.get(TieredCredentialStore::TOKEN_KEY).unwrap(), None);
        assert_eq!(creds.token().unwrap(), Some("mock_token_123".to_string()));
    }

    #[test]
    fn test_session_tier_and_switching_tiers() {
        let (creds, durable, session) = store();
        creds.store_token("durable", StorageTier::Durable).unwrap();
        creds.store_token("ephemeral", StorageTier::Session).unwrap();

        assert_eq!(durable.get(TieredCredentialStore::TOKEN_KEY).unwrap(), None);
        assert_eq!(
            session.get(TieredCredentialStore::TOKEN_KEY).unwrap(),
            Some("ephemeral".to_string())
        );
        assert_eq!(creds.token().unwrap(), Some("ephemeral".to_string()));
    }

    #[test]
    fn test_clear_empties_both_tiers() {
        let (creds, durable, session) = store();
        durable.set(TieredCredentialStore::TOKEN_KEY, "a").unwrap();
        session.set(TieredCredentialStore::TOKEN_KEY, "b").unwrap();

        creds.clear().unwrap();

        assert_eq!(creds.token().unwrap(), None);
    }
}
