//! Authentication capabilities.
//!
//! Authentication here is a gate only: a token is obtained from the OTP
//! service, kept in one of two storage tiers, and its presence decides
//! whether the chat operations are reachable.

mod credential;
mod otp;

pub use credential::{CredentialStore, StorageTier};
pub use otp::OtpService;
