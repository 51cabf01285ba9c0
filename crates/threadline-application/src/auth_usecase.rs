//! Credential gate.

use std::sync::Arc;

use threadline_core::auth::{CredentialStore, StorageTier};
use threadline_core::config::AppConfig;
use threadline_core::error::{Result, ThreadlineError};
use threadline_core::thread::{SnapshotRepository, ThreadStore};

/// Use case guarding the chat views behind a session token.
///
/// Logout clears the thread store before the credential, so no thread data
/// is observable once the token is gone.
pub struct AuthUseCase {
    store: Arc<ThreadStore>,
    credentials: Arc<dyn CredentialStore>,
    snapshots: Arc<dyn SnapshotRepository>,
    clear_snapshot_on_logout: bool,
}

impl AuthUseCase {
    pub fn new(
        store: Arc<ThreadStore>,
        credentials: Arc<dyn CredentialStore>,
        snapshots: Arc<dyn SnapshotRepository>,
        config: &AppConfig,
    ) -> Self {
        Self {
            store,
            credentials,
            snapshots,
            clear_snapshot_on_logout: config.clear_snapshot_on_logout,
        }
    }

    /// Stores `token`, durably when `remember` is set.
    pub fn login(&self, token: &str, remember: bool) -> Result<()> {
        if token.trim().is_empty() {
            return Err(ThreadlineError::invalid_input("Token is empty"));
        }
        let tier = StorageTier::for_remember(remember);
        self.credentials.store_token(token, tier)?;
        tracing::info!("[AuthUseCase] Logged in ({} tier)", tier);
        Ok(())
    }

    pub fn is_authenticated(&self) -> Result<bool> {
        Ok(self.credentials.token()?.is_some())
    }

    /// Returns the token, or `Unauthenticated` when there is none.
    pub fn require_authenticated(&self) -> Result<String> {
        self.credentials
            .token()?
            .ok_or_else(|| ThreadlineError::Unauthenticated("Please log in first".to_string()))
    }

    /// Ends the session.
    ///
    /// Order: reset the store (cancelling pending replies), clear both
    /// credential tiers, then drop the snapshot if configured to.
    pub fn logout(&self) -> Result<()> {
        self.store.reset_session();
        self.credentials.clear()?;
        if self.clear_snapshot_on_logout {
            self.snapshots.clear()?;
        }
        tracing::info!("[AuthUseCase] Logged out");
        Ok(())
    }
}
