//! Country reference data.

mod model;
mod service;

pub use model::{Country, CountryFlags, CountryIdd, CountryName};
pub use service::ReferenceDataService;
