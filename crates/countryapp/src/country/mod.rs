use crate::prelude::*;
use countryapp_core::routes::{DEFAULT_ROUTE, ROUTES};
use std::time::Duration;

pub mod by_capital;
pub mod page;
pub mod service;

use countryapp_core::country::DEFAULT_API_BASE;

/// Country module app - root command
#[derive(Debug, clap::Parser)]
#[command(name = "country")]
#[command(about = "Country search operations")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Search countries by capital name
    #[clap(name = "by-capital")]
    ByCapital(by_capital::ByCapitalOptions),

    /// Show the navigation table
    #[clap(name = "routes")]
    Routes,
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    match app.command {
        Commands::ByCapital(options) => by_capital::run(options, global).await,
        Commands::Routes => {
            print_routes();
            Ok(())
        }
    }
}

fn print_routes() {
    let mut table = new_table();
    table.set_titles(prettytable::row!["Path", "Page"]);
    for route in ROUTES {
        table.add_row(prettytable::row![format!("/{}", route.path()), route.title()]);
    }
    table.add_row(prettytable::row!["/**", format!("redirect to /{DEFAULT_ROUTE}")]);
    table.printstd();
}

/// REST Countries configuration from environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for CountryConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl CountryConfig {
    /// Default request timeout in seconds
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Load configuration from environment variables
    ///
    /// Uses COUNTRIES_API_BASE_URL and COUNTRIES_API_TIMEOUT, falling back to
    /// the public API and a 30 second timeout.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("COUNTRIES_API_BASE_URL") {
            config.base_url = url;
        }

        if let Ok(raw) = std::env::var("COUNTRIES_API_TIMEOUT") {
            let secs = raw
                .parse::<u64>()
                .map_err(|_| eyre!("Invalid COUNTRIES_API_TIMEOUT: {}", raw))?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Apply CLI overrides to the configuration
    pub fn with_overrides(mut self, base_url: Option<String>, timeout: Option<u64>) -> Self {
        if let Some(url) = base_url {
            self.base_url = url;
        }
        if let Some(secs) = timeout {
            self.timeout = Duration::from_secs(secs);
        }
        self
    }

    /// Resolve the configuration for a command invocation
    pub fn for_global(global: &crate::Global) -> Result<Self> {
        Ok(Self::from_env()?.with_overrides(global.base_url.clone(), global.timeout))
    }
}

/// Create the HTTP client used for API requests
pub fn create_client(config: &CountryConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.timeout)
        .user_agent(concat!("countryapp/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| eyre!("Failed to build HTTP client: {}", e))
}
