use crate::prelude::*;
use clap::Parser;

mod country;
mod error;
mod prelude;
mod serve;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Search countries by capital using the REST Countries API"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// REST Countries API base URL
    #[clap(long, env = "COUNTRIES_API_BASE_URL", global = true)]
    base_url: Option<String>,

    /// HTTP request timeout in seconds
    #[clap(long, env = "COUNTRIES_API_TIMEOUT", global = true)]
    timeout: Option<u64>,

    /// Whether to display additional information.
    #[clap(long, env = "COUNTRYAPP_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Country search operations
    Country(crate::country::App),

    /// Serve the by-capital page over HTTP
    Serve(crate::serve::App),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::Country(sub_app) => crate::country::run(sub_app, app.global).await,
        SubCommands::Serve(sub_app) => crate::serve::run(sub_app, app.global).await,
    }
}
