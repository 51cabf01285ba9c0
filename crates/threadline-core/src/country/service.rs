use super::model::Country;
use crate::error::Result;
use async_trait::async_trait;

/// Read-only source of country records, fetched once per login screen.
#[async_trait]
pub trait ReferenceDataService: Send + Sync {
    async fn countries(&self) -> Result<Vec<Country>>;
}
