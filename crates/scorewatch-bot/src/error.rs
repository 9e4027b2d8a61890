use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Telegram API error: {0}")]
    Telegram(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Scrape failed: {0}")]
    Scrape(#[from] ScrapeFailure),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] scorewatch_core::Error),

    #[error("Invalid schedule '{0}', expected HH:MM")]
    InvalidSchedule(String),

    #[error("Health server error: {0}")]
    Server(String),

    #[error("Failed to read subscribers: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Why a scrape produced no records
#[derive(Error, Debug)]
pub enum ScrapeFailure {
    /// The browser could not be started
    #[error("browser could not be initialized: {0}")]
    Init(String),

    #[error("{0}")]
    Other(String),
}

impl From<scorewatch_browser::Error> for ScrapeFailure {
    fn from(err: scorewatch_browser::Error) -> Self {
        if err.is_init() {
            ScrapeFailure::Init(err.to_string())
        } else {
            ScrapeFailure::Other(err.to_string())
        }
    }
}
