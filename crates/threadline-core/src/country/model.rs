//! Country reference data used by the login form.

use serde::{Deserialize, Serialize};

/// Common and official names of a country.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryName {
    pub common: String,
    #[serde(default)]
    pub official: String,
}

/// Flag image locations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryFlags {
    #[serde(default)]
    pub png: String,
    #[serde(default)]
    pub svg: String,
    #[serde(default)]
    pub alt: String,
}

/// International direct dialing prefix, split as the reference API ships it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryIdd {
    #[serde(default)]
    pub root: String,
    #[serde(default)]
    pub suffixes: Vec<String>,
}

/// One country record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub name: CountryName,
    #[serde(default)]
    pub flags: CountryFlags,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idd: Option<CountryIdd>,
    /// ISO 3166-1 alpha-2 code
    pub cca2: String,
}

impl Country {
    /// Calling code: `idd.root` followed by the first suffix.
    ///
    /// Empty when the country has no dialing root.
    pub fn calling_code(&self) -> String {
        match &self.idd {
            Some(idd) if !idd.root.is_empty() => {
                let suffix = idd.suffixes.first().map(String::as_str).unwrap_or("");
                format!("{}{}", idd.root, suffix)
            }
            _ => String::new(),
        }
    }

    pub fn display_name(&self) -> &str {
        &self.name.common
    }
}
