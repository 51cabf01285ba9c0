use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Owner id stamped on threads created from this client.
pub const DEFAULT_USER_ID: &str = "cmck53t7a000ioopn5rpmdfvt";

/// Reference data endpoint, restricted to the fields the login form uses.
pub const DEFAULT_COUNTRIES_ENDPOINT: &str =
    "https://restcountries.com/v3.1/all?fields=name,flags,idd,cca2";

/// Application configuration (`config.toml`).
///
/// Every field has a default, so a partial or empty file is valid.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Owner id for newly created threads
    pub user_id: String,
    /// cca2 code pre-selected on the login form
    pub default_country: String,
    /// Simulated latency of the reply service
    pub reply_delay_ms: u64,
    /// Simulated latency of the delete acknowledgement
    pub delete_delay_ms: u64,
    /// Simulated latency of the bulk thread load
    pub load_delay_ms: u64,
    /// Simulated latency of the OTP send/verify calls
    pub otp_delay_ms: u64,
    /// Upper bound on any awaited external call
    pub service_timeout_ms: u64,
    /// Reference data endpoint
    pub countries_endpoint: String,
    /// Use the built-in country list instead of the HTTP endpoint
    pub offline_countries: bool,
    /// Drop the persisted thread snapshot on logout
    pub clear_snapshot_on_logout: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            user_id: DEFAULT_USER_ID.to_string(),
            default_country: "IN".to_string(),
            reply_delay_ms: 1500,
            delete_delay_ms: 1500,
            load_delay_ms: 1500,
            otp_delay_ms: 1500,
            service_timeout_ms: 10_000,
            countries_endpoint: DEFAULT_COUNTRIES_ENDPOINT.to_string(),
            offline_countries: false,
            clear_snapshot_on_logout: true,
        }
    }
}

impl AppConfig {
    pub fn service_timeout(&self) -> Duration {
        Duration::from_millis(self.service_timeout_ms)
    }

    pub fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.reply_delay_ms)
    }

    pub fn delete_delay(&self) -> Duration {
        Duration::from_millis(self.delete_delay_ms)
    }

    pub fn load_delay(&self) -> Duration {
        Duration::from_millis(self.load_delay_ms)
    }

    pub fn otp_delay(&self) -> Duration {
        Duration::from_millis(self.otp_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: AppConfig = toml::from_str("reply_delay_ms = 10\noffline_countries = true").unwrap();
        assert_eq!(config.reply_delay(), Duration::from_millis(10));
        assert!(config.offline_countries);
        assert_eq!(config.default_country, "IN");
        assert_eq!(config.service_timeout_ms, 10_000);
        assert!(config.clear_snapshot_on_logout);
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
    }
}
