use async_trait::async_trait;
use std::time::Duration;
use threadline_core::auth::OtpService;
use threadline_core::error::Result;

/// Token handed out by [`MockOtpService`] for any code.
pub const MOCK_TOKEN: &str = "mock_token_123";

/// OTP service that accepts every code after a delay.
#[derive(Debug, Clone)]
pub struct MockOtpService {
    delay: Duration,
}

impl MockOtpService {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl OtpService for MockOtpService {
    async fn send_code(&self, phone_number: &str) -> Result<()> {
        tokio::time::sleep(self.delay).await;
        tracing::info!("[MockOtpService] Verification code sent to {}", phone_number);
        Ok(())
    }

    async fn verify_code(&self, phone_number: &str, _code: &str) -> Result<String> {
        tokio::time::sleep(self.delay).await;
        tracing::debug!("[MockOtpService] Code accepted for {}", phone_number);
        Ok(MOCK_TOKEN.to_string())
    }
}
