use crate::error::Result;
use serde::{Deserialize, Serialize};
use strum::Display;

/// Where a session token is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[strum(serialize_all = "lowercase")]
pub enum StorageTier {
    /// Survives restarts ("remember me").
    Durable,
    /// Lives only as long as the current session.
    Session,
}

impl StorageTier {
    pub fn for_remember(remember: bool) -> Self {
        if remember { Self::Durable } else { Self::Session }
    }
}

/// Holder of the opaque session token that gates the chat views.
pub trait CredentialStore: Send + Sync {
    /// Stores `token` in `tier`.
    fn store_token(&self, token: &str, tier: StorageTier) -> Result<()>;

    /// Returns the token, looking at the durable tier before the session tier.
    fn token(&self) -> Result<Option<String>>;

    /// Removes the token from both tiers.
    fn clear(&self) -> Result<()>;
}
