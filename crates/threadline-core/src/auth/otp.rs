use crate::error::Result;
use async_trait::async_trait;

/// One-time-password login round trip.
#[async_trait]
pub trait OtpService: Send + Sync {
    /// Sends a verification code to `phone_number` (calling code included).
    async fn send_code(&self, phone_number: &str) -> Result<()>;

    /// Checks `code` for `phone_number` and returns a session token.
    async fn verify_code(&self, phone_number: &str, code: &str) -> Result<String>;
}
