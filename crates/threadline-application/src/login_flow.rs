//! Phone + one-time-password login.

use std::sync::Arc;
use std::time::Duration;

use threadline_core::auth::OtpService;
use threadline_core::config::AppConfig;
use threadline_core::country::{Country, ReferenceDataService};
use threadline_core::error::{Result, ThreadlineError};

use crate::auth_usecase::AuthUseCase;

/// Length of a verification code.
pub const CODE_LENGTH: usize = 6;

/// Error recorded when the country list cannot be fetched.
pub const COUNTRIES_FAILED_MESSAGE: &str = "Failed to load countries";

/// Which form the login flow is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginStep {
    /// Country + phone number entry
    Credentials,
    /// Verification code entry
    Otp,
}

/// State machine behind the login screen.
pub struct LoginFlow {
    reference: Arc<dyn ReferenceDataService>,
    otp: Arc<dyn OtpService>,
    auth: Arc<AuthUseCase>,
    default_country: String,
    timeout: Duration,

    step: LoginStep,
    countries: Vec<Country>,
    selected: Option<Country>,
    phone_number: String,
    code: String,
    busy: bool,
    error: Option<String>,
}

impl LoginFlow {
    pub fn new(
        reference: Arc<dyn ReferenceDataService>,
        otp: Arc<dyn OtpService>,
        auth: Arc<AuthUseCase>,
        config: &AppConfig,
    ) -> Self {
        Self {
            reference,
            otp,
            auth,
            default_country: config.default_country.clone(),
            timeout: config.service_timeout(),
            step: LoginStep::Credentials,
            countries: Vec::new(),
            selected: None,
            phone_number: String::new(),
            code: String::new(),
            busy: false,
            error: None,
        }
    }

    pub fn step(&self) -> LoginStep {
        self.step
    }

    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    pub fn selected_country(&self) -> Option<&Country> {
        self.selected.as_ref()
    }

    pub fn phone_number(&self) -> &str {
        &self.phone_number
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Fetches the country list and pre-selects the default country.
    ///
    /// A failure is recorded on the flow and returned; the form stays usable.
    pub async fn load_countries(&mut self) -> Result<usize> {
        self.busy = true;
        let result = tokio::time::timeout(self.timeout, self.reference.countries()).await;
        self.busy = false;

        let countries = match result {
            Ok(Ok(countries)) => countries,
            Ok(Err(e)) => return Err(self.record_countries_failure(e)),
            Err(_) => {
                let e = ThreadlineError::timeout("fetch countries", self.timeout);
                return Err(self.record_countries_failure(e));
            }
        };

        self.error = None;
        if self.selected.is_none() {
            self.selected = countries
                .iter()
                .find(|c| c.cca2.eq_ignore_ascii_case(&self.default_country))
                .cloned();
        }
        self.countries = countries;
        tracing::debug!("[LoginFlow] {} countries available", self.countries.len());
        Ok(self.countries.len())
    }

    fn record_countries_failure(&mut self, error: ThreadlineError) -> ThreadlineError {
        tracing::error!("[LoginFlow] Failed to load countries: {}", error);
        self.error = Some(COUNTRIES_FAILED_MESSAGE.to_string());
        error
    }

    /// Selects a country from the loaded list by its cca2 code.
    pub fn select_country(&mut self, cca2: &str) -> Result<()> {
        let country = self
            .countries
            .iter()
            .find(|c| c.cca2.eq_ignore_ascii_case(cca2))
            .cloned()
            .ok_or_else(|| ThreadlineError::not_found("Country", cca2))?;
        self.selected = Some(country);
        Ok(())
    }

    pub fn set_phone_number(&mut self, phone_number: &str) {
        self.phone_number = phone_number.trim().to_string();
    }

    /// Calling code of the selected country followed by the phone number.
    ///
    /// Empty while either part is missing.
    pub fn full_phone_number(&self) -> String {
        match &self.selected {
            Some(country) if !self.phone_number.is_empty() => {
                format!("{}{}", country.calling_code(), self.phone_number)
            }
            _ => String::new(),
        }
    }

    /// Sends a verification code and moves to the code form.
    pub async fn request_code(&mut self) -> Result<()> {
        if self.selected.is_none() {
            return Err(ThreadlineError::invalid_input("Select a country first"));
        }
        if self.phone_number.is_empty() {
            return Err(ThreadlineError::invalid_input("Phone number is required"));
        }
        let phone_number = self.full_phone_number();

        self.busy = true;
        let result = tokio::time::timeout(self.timeout, self.otp.send_code(&phone_number)).await;
        self.busy = false;

        match result {
            Ok(Ok(())) => {
                self.step = LoginStep::Otp;
                tracing::info!("[LoginFlow] Code requested for {}", phone_number);
                Ok(())
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(ThreadlineError::timeout("send code", self.timeout)),
        }
    }

    /// Verifies a six-digit code and logs in with the returned token.
    pub async fn verify(&mut self, code: &str, remember: bool) -> Result<()> {
        if self.step != LoginStep::Otp {
            return Err(ThreadlineError::invalid_input("Request a code first"));
        }
        self.code = code.trim().to_string();
        if self.code.len() != CODE_LENGTH || !self.code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ThreadlineError::invalid_input(format!(
                "Verification code must be {} digits",
                CODE_LENGTH
            )));
        }
        let phone_number = self.full_phone_number();

        self.busy = true;
        let result =
            tokio::time::timeout(self.timeout, self.otp.verify_code(&phone_number, &self.code))
                .await;
        self.busy = false;

        let token = match result {
            Ok(token) => token?,
            Err(_) => {
                return Err(ThreadlineError::timeout("verify code", self.timeout));
            }
        };
        self.auth.login(&token, remember)
    }

    /// Returns to the phone number form, discarding the entered code.
    pub fn back(&mut self) {
        self.step = LoginStep::Credentials;
        self.code.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use threadline_core::auth::{CredentialStore, StorageTier};
    use threadline_core::country::{CountryIdd, CountryName};
    use threadline_core::thread::{SnapshotRepository, ThreadSnapshot, ThreadStore};

    fn country(cca2: &str, root: &str, suffix: &str) -> Country {
        Country {
            name: CountryName {
                common: cca2.to_string(),
                official: cca2.to_string(),
            },
            flags: Default::default(),
            idd: Some(CountryIdd {
                root: root.to_string(),
                suffixes: vec![suffix.to_string()],
            }),
            cca2: cca2.to_string(),
        }
    }

    struct FixedCountries(Option<Vec<Country>>);

    #[async_trait]
    impl ReferenceDataService for FixedCountries {
        async fn countries(&self) -> Result<Vec<Country>> {
            self.0
                .clone()
                .ok_or_else(|| ThreadlineError::service("unreachable"))
        }
    }

    #[derive(Default)]
    struct RecordingOtp {
        sent_to: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl OtpService for RecordingOtp {
        async fn send_code(&self, phone_number: &str) -> Result<()> {
            self.sent_to.lock().unwrap().push(phone_number.to_string());
            Ok(())
        }

        async fn verify_code(&self, _phone_number: &str, _code: &str) -> Result<String> {
            Ok("token-1".to_string())
        }
    }

    #[derive(Default)]
    struct SessionOnly(Mutex<Option<(String, StorageTier)>>);

    impl CredentialStore for SessionOnly {
        fn store_token(&self, token: &str, tier: StorageTier) -> Result<()> {
            *self.0.lock().unwrap() = Some((token.to_string(), tier));
            Ok(())
        }
        fn token(&self) -> Result<Option<String>> {
            Ok(self.0.lock().unwrap().as_ref().map(|(t, _)| t.clone()))
        }
        fn clear(&self) -> Result<()> {
            *self.0.lock().unwrap() = None;
            Ok(())
        }
    }

    struct NoSnapshots;

    impl SnapshotRepository for NoSnapshots {
        fn load(&self) -> Result<Option<ThreadSnapshot>> {
            Ok(None)
        }
        fn save(&self, _snapshot: &ThreadSnapshot) -> Result<()> {
            Ok(())
        }
        fn clear(&self) -> Result<()> {
            Ok(())
        }
    }

    fn flow(countries: Option<Vec<Country>>) -> (LoginFlow, Arc<RecordingOtp>, Arc<SessionOnly>) {
        let config = AppConfig::default();
        let otp = Arc::new(RecordingOtp::default());
        let credentials = Arc::new(SessionOnly::default());
        let snapshots = Arc::new(NoSnapshots);
        let store = Arc::new(ThreadStore::new(snapshots.clone()));
        let auth = Arc::new(AuthUseCase::new(store, credentials.clone(), snapshots, &config));
        let flow = LoginFlow::new(Arc::new(FixedCountries(countries)), otp.clone(), auth, &config);
        (flow, otp, credentials)
    }

    fn sample() -> Vec<Country> {
        vec![country("US", "+1", "201"), country("IN", "+9", "1")]
    }

    #[tokio::test]
    async fn test_load_countries_selects_default() {
        let (mut flow, _, _) = flow(Some(sample()));
        assert_eq!(flow.load_countries().await.unwrap(), 2);
        assert_eq!(flow.selected_country().unwrap().cca2, "IN");
        assert!(!flow.is_busy());
    }

    #[tokio::test]
    async fn test_load_failure_is_recorded() {
        let (mut flow, _, _) = flow(None);
        assert!(flow.load_countries().await.is_err());
        assert_eq!(flow.error(), Some(COUNTRIES_FAILED_MESSAGE));
        assert!(flow.countries().is_empty());
        assert!(!flow.is_busy());
    }

    #[tokio::test]
    async fn test_full_phone_number_needs_both_parts() {
        let (mut flow, _, _) = flow(Some(sample()));
        flow.load_countries().await.unwrap();
        assert_eq!(flow.full_phone_number(), "");

        flow.set_phone_number(" 9876543210 ");
        assert_eq!(flow.full_phone_number(), "+919876543210");

        flow.select_country("us").unwrap();
        assert_eq!(flow.full_phone_number(), "+12019876543210");
        assert!(flow.select_country("ZZ").unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_request_code_requires_phone() {
        let (mut flow, otp, _) = flow(Some(sample()));
        flow.load_countries().await.unwrap();

        assert!(flow.request_code().await.is_err());
        assert_eq!(flow.step(), LoginStep::Credentials);
        assert!(otp.sent_to.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_full_login_round_trip() {
        let (mut flow, otp, credentials) = flow(Some(sample()));
        flow.load_countries().await.unwrap();
        flow.set_phone_number("9876543210");

        flow.request_code().await.unwrap();
        assert_eq!(flow.step(), LoginStep::Otp);
        assert_eq!(otp.sent_to.lock().unwrap()[0], "+919876543210");

        assert!(flow.verify("12345", true).await.is_err());
        assert!(flow.verify("12a456", true).await.is_err());
        assert_eq!(credentials.token().unwrap(), None);

        flow.verify("123456", false).await.unwrap();
        assert_eq!(
            *credentials.0.lock().unwrap(),
            Some(("token-1".to_string(), StorageTier::Session))
        );
        assert!(!flow.is_busy());
    }

    #[tokio::test]
    async fn test_verify_before_request_and_back() {
        let (mut flow, _, _) = flow(Some(sample()));
        flow.load_countries().await.unwrap();
        assert!(flow.verify("123456", true).await.is_err());

        flow.set_phone_number("5550100");
        flow.request_code().await.unwrap();
        let _ = flow.verify("99", true).await;
        assert_eq!(flow.code(), "99");

        flow.back();
        assert_eq!(flow.step(), LoginStep::Credentials);
        assert_eq!(flow.code(), "");
    }
}
