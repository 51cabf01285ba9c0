//! Country reference data sources.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use threadline_core::country::{Country, CountryFlags, CountryIdd, CountryName, ReferenceDataService};
use threadline_core::error::{Result, ThreadlineError};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetches countries from a restcountries-compatible endpoint.
#[derive(Clone)]
pub struct RestCountriesService {
    client: Client,
    endpoint: String,
}

impl RestCountriesService {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ReferenceDataService for RestCountriesService {
    async fn countries(&self) -> Result<Vec<Country>> {
        let response = self
            .client
            .get(&self.endpoint)
            .header("Content-Type", "application/json")
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ThreadlineError::timeout("fetch countries", REQUEST_TIMEOUT)
                } else {
                    ThreadlineError::service(format!("Failed to fetch countries: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!("[RestCountriesService] API error ({}): {}", status, error_text);
            return Err(ThreadlineError::service(format!(
                "Countries API error ({}): {}",
                status, error_text
            )));
        }

        let countries = response.json::<Vec<Country>>().await.map_err(|e| {
            ThreadlineError::service(format!("Failed to parse countries response: {}", e))
        })?;

        tracing::debug!("[RestCountriesService] Fetched {} countries", countries.len());
        Ok(countries)
    }
}

/// Built-in country list for offline use.
#[derive(Debug, Clone)]
pub struct StaticCountryService {
    countries: Vec<Country>,
}

impl StaticCountryService {
    pub fn new(countries: Vec<Country>) -> Self {
        Self { countries }
    }
}

impl Default for StaticCountryService {
    fn default() -> Self {
        Self::new(builtin_countries())
    }
}

#[async_trait]
impl ReferenceDataService for StaticCountryService {
    async fn countries(&self) -> Result<Vec<Country>> {
        Ok(self.countries.clone())
    }
}

fn country(cca2: &str, common: &str, official: &str, root: &str, suffix: &str) -> Country {
    let code = cca2.to_lowercase();
    Country {
        name: CountryName {
            common: common.to_string(),
            official: official.to_string(),
        },
        flags: CountryFlags {
            png: format!("https://flagcdn.com/w320/{}.png", code),
            svg: format!("https://flagcdn.com/{}.svg", code),
            alt: String::new(),
        },
        idd: Some(CountryIdd {
            root: root.to_string(),
            suffixes: if suffix.is_empty() {
                Vec::new()
            } else {
                vec![suffix.to_string()]
            },
        }),
        cca2: cca2.to_string(),
    }
}

fn builtin_countries() -> Vec<Country> {
    vec![
        country("IN", "India", "Republic of India", "+9", "1"),
        country("US", "United States", "United States of America", "+1", ""),
        country(
            "GB",
            "United Kingdom",
            "United Kingdom of Great Britain and Northern Ireland",
            "+4",
            "4",
        ),
        country("AE", "United Arab Emirates", "United Arab Emirates", "+9", "71"),
        country("AU", "Australia", "Commonwealth of Australia", "+6", "1"),
        country("DE", "Germany", "Federal Republic of Germany", "+4", "9"),
        country("JP", "Japan", "Japan", "+8", "1"),
        country("KR", "South Korea", "Republic of Korea", "+8", "2"),
        country("SG", "Singapore", "Republic of Singapore", "+6", "5"),
        Country {
            name: CountryName {
                common: "Antarctica".to_string(),
                official: "Antarctica".to_string(),
            },
            flags: CountryFlags::default(),
            idd: None,
            cca2: "AQ".to_string(),
        },
    ]
}
