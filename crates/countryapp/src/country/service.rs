use async_trait::async_trait;
use countryapp_core::country::{capital_search_url, map_rest_countries, Country, RestCountry};

use super::{create_client, CountryConfig};
use crate::prelude::Error;

/// Search backend used by the by-capital page
///
/// Every call issues at most one request and resolves exactly once.
#[async_trait]
pub trait CountrySearch: Send + Sync {
    async fn search_by_capital(&self, query: &str) -> Result<Vec<Country>, Error>;
}

/// REST Countries API client
#[derive(Debug, Clone)]
pub struct CountryService {
    client: reqwest::Client,
    base_url: String,
}

impl CountryService {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn from_config(config: &CountryConfig) -> color_eyre::eyre::Result<Self> {
        Ok(Self::new(create_client(config)?, config.base_url.clone()))
    }

    /// Fetch the raw API records whose capital matches `query`
    pub async fn fetch_by_capital(&self, query: &str) -> Result<Vec<RestCountry>, Error> {
        let url = capital_search_url(&self.base_url, query);
        log::debug!("GET {url}");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                url,
            });
        }

        response
            .json::<Vec<RestCountry>>()
            .await
            .map_err(|e| Error::Decode(e.to_string()))
    }
}

#[async_trait]
impl CountrySearch for CountryService {
    async fn search_by_capital(&self, query: &str) -> Result<Vec<Country>, Error> {
        let dtos = self.fetch_by_capital(query).await?;
        Ok(map_rest_countries(&dtos))
    }
}
