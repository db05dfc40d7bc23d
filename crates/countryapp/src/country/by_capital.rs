use crate::prelude::{eprintln, print, println, *};
use colored::Colorize;
use countryapp_core::country::{format_population, Country};
use countryapp_core::page::PageState;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::page::{ByCapitalPage, SearchOutcome};
use super::service::{CountrySearch, CountryService};
use super::CountryConfig;

#[derive(Debug, clap::Args, Clone)]
pub struct ByCapitalOptions {
    /// Capital name to search for. Reads one query per line from stdin when omitted.
    #[arg(value_name = "QUERY")]
    pub query: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Print the unmapped API records as JSON
    #[arg(long, requires = "query")]
    pub raw: bool,
}

pub async fn run(options: ByCapitalOptions, global: crate::Global) -> Result<()> {
    let config = CountryConfig::for_global(&global)?;

    if global.verbose {
        eprintln!("Countries API Base: {}", config.base_url);
        eprintln!("Timeout: {}s", config.timeout.as_secs());
        eprintln!();
    }

    let service = Arc::new(CountryService::from_config(&config)?);

    if options.raw {
        let query = options.query.as_deref().unwrap_or_default();
        let records = service
            .fetch_by_capital(query)
            .await
            .map_err(|e| eyre!("Failed to search capital '{}': {}", query, e))?;
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    let page = ByCapitalPage::new(service);

    match &options.query {
        Some(query) => search(&page, query, &options, &global).await?,
        None => {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Some(line) = lines.next_line().await? {
                let query = line.trim();
                if query.is_empty() {
                    continue;
                }
                search(&page, query, &options, &global).await?;
            }
            page.dispose();
        }
    }

    Ok(())
}

async fn search<S: CountrySearch>(
    page: &ByCapitalPage<S>,
    query: &str,
    options: &ByCapitalOptions,
    global: &crate::Global,
) -> Result<()> {
    if global.verbose {
        eprintln!("Searching capital: {}", query);
    }

    let outcome = page.on_change(query).await;

    if outcome == SearchOutcome::Ignored {
        eprintln!(
            "{}",
            format!("A search is already in progress, ignoring '{query}'").yellow()
        );
        return Ok(());
    }

    let state = page.state();
    if options.json {
        println!("{}", format_state_json(&state)?);
    } else {
        print!("{}", format_state_text(&state, query));
    }

    Ok(())
}

/// Convert page state to JSON string
fn format_state_json(state: &PageState) -> Result<String> {
    serde_json::to_string_pretty(state).map_err(|e| eyre!("JSON serialization failed: {}", e))
}

/// Render countries as a table
fn format_countries_table(countries: &[Country]) -> String {
    let mut table = new_table();
    table.set_titles(prettytable::row![
        "Flag",
        "Code",
        "Name",
        "Capital",
        "Population",
        "Region",
        "Subregion"
    ]);

    for country in countries {
        table.add_row(prettytable::row![
            country.flag,
            country.cca2,
            country.name,
            country.capital,
            format_population(country.population),
            country.region,
            country.sub_region
        ]);
    }

    table.to_string()
}

/// Convert page state to formatted text with colors
fn format_state_text(state: &PageState, query: &str) -> String {
    let mut result = String::new();
    let count = state.countries().len();

    result.push_str(&format!("\n{}\n", "=".repeat(80).bright_cyan()));
    result.push_str(&format!(
        "{}\n",
        format!(
            "CAPITAL SEARCH: {} ({} {})",
            query.to_uppercase(),
            count,
            if count == 1 { "country" } else { "countries" }
        )
        .bright_cyan()
        .bold()
    ));
    result.push_str(&format!("{}\n", "=".repeat(80).bright_cyan()));

    if let Some(error) = state.is_error() {
        result.push_str(&format!("\n{} {}\n", "Error:".red().bold(), error.red()));
        if count > 0 {
            result.push_str(&format!("{}\n", "Showing previous results.".yellow()));
        }
    }

    if count == 0 {
        if state.is_error().is_none() {
            result.push_str(&format!(
                "\n{}\n",
                format!("No countries found with capital '{query}'.").yellow()
            ));
        }
        result.push('\n');
        return result;
    }

    result.push('\n');
    result.push_str(&format_countries_table(state.countries()));

    result.push_str(&format!("\n{}:\n", "Flags".bright_white().bold()));
    for country in state.countries() {
        result.push_str(&format!(
            "  {}: {}\n",
            country.cca2.green(),
            country.flag_svg.cyan().underline()
        ));
    }

    result.push('\n');
    result
}
