use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default base URL of the REST Countries API
pub const DEFAULT_API_BASE: &str = "https://restcountries.com/v3.1";

/// Name used when a country has no Spanish translation
pub const NO_SPANISH_NAME: &str = "No Spanish Name";

/// Translation key consumed for the display name
const SPANISH: &str = "spa";

/// Country record from the REST Countries API
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct RestCountry {
    #[serde(default)]
    pub capital: Vec<String>,
    pub cca2: String,
    pub flags: RestFlags,
    pub flag: String,
    pub population: u64,
    pub region: String,
    #[serde(default)]
    pub subregion: String,
    #[serde(default)]
    pub translations: HashMap<String, RestTranslation>,
}

/// Flag images of a country
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct RestFlags {
    pub svg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub png: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

/// Country name in a given language
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct RestTranslation {
    pub common: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub official: Option<String>,
}

/// Country view model rendered by the CLI and the server
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    pub capital: String,
    pub cca2: String,
    pub flag_svg: String,
    pub flag: String,
    pub population: u64,
    pub region: String,
    pub sub_region: String,
    pub name: String,
}

/// Build the capital search URL for a query
///
/// The query is percent-encoded as a single path segment, so "Buenos Aires"
/// becomes `/capital/Buenos%20Aires`. An empty query is passed through.
pub fn capital_search_url(base_url: &str, query: &str) -> String {
    format!(
        "{}/capital/{}",
        base_url.trim_end_matches('/'),
        urlencoding::encode(query)
    )
}

/// Transform a REST Countries record into a `Country`
///
/// Never fails: an empty capital list produces an empty string and a
/// missing Spanish translation produces [`NO_SPANISH_NAME`].
pub fn map_rest_country(country: &RestCountry) -> Country {
    Country {
        capital: country.capital.join(", "),
        cca2: country.cca2.clone(),
        flag_svg: country.flags.svg.clone(),
        flag: country.flag.clone(),
        population: country.population,
        region: country.region.clone(),
        sub_region: country.subregion.clone(),
        name: country
            .translations
            .get(SPANISH)
            .map(|t| t.common.clone())
            .unwrap_or_else(|| NO_SPANISH_NAME.to_string()),
    }
}

/// Transform a list of REST Countries records, preserving order
pub fn map_rest_countries(countries: &[RestCountry]) -> Vec<Country> {
    countries.iter().map(map_rest_country).collect()
}

/// Format a population with thousands separators
///
/// 67000000 becomes "67,000,000".
pub fn format_population(population: u64) -> String {
    let digits = population.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    out
}
