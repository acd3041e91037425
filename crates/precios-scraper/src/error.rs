use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("scrape cancelled")]
    Cancelled,

    #[error("invalid input: {0}")]
    InvalidInput(#[from] precios_core::CoreError),
}

impl ScrapeError {
    /// The one run-fatal condition. Everything else is absorbed at the
    /// strategy boundary and the chain moves on.
    #[must_use]
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
