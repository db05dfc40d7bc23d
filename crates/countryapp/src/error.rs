#[derive(thiserror::Error, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Error {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Countries API returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Failed to decode countries response: {0}")]
    Decode(String),
}
