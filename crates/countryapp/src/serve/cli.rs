#[derive(Debug, clap::Parser)]
#[command(name = "serve")]
#[command(about = "Serve the by-capital page over HTTP")]
pub struct App {
    /// Port to listen on
    #[arg(short, long, env = "COUNTRYAPP_PORT", default_value = "3000")]
    pub port: u16,

    /// Host to bind to
    #[arg(long, env = "COUNTRYAPP_HOST", default_value = "127.0.0.1")]
    pub host: String,
}
