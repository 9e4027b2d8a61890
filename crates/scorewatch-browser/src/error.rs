use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Chrome could not be found or started; never retried
    #[error("Browser could not be initialized: {0}")]
    Init(String),

    #[error("Failed to load {url}: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Timed out after {after:?} loading {url}")]
    Timeout { url: String, after: Duration },

    #[error("CDP error: {0}")]
    Cdp(String),

    #[error("Scrape failed: {0}")]
    Scrape(#[from] scorewatch_core::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<chromiumoxide::error::CdpError> for Error {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        Error::Cdp(err.to_string())
    }
}

impl Error {
    /// Convert into the pipeline's error for a page load of `url`
    pub(crate) fn for_page(self, url: &str) -> scorewatch_core::Error {
        match self {
            Error::Timeout { url, .. } => scorewatch_core::Error::Timeout { url },
            Error::Navigation { url, reason } => scorewatch_core::Error::Navigation { url, reason },
            Error::Scrape(err) => err,
            other => scorewatch_core::Error::Navigation {
                url: url.to_string(),
                reason: other.to_string(),
            },
        }
    }

    pub fn is_init(&self) -> bool {
        matches!(self, Error::Init(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_maps_to_pipeline_timeout() {
        let err = Error::Timeout {
            url: "https://example.com/a".to_string(),
            after: Duration::from_secs(30),
        };

        match err.for_page("https://example.com/a") {
            scorewatch_core::Error::Timeout { url } => assert_eq!(url, "https://example.com/a"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_cdp_error_keeps_page_url() {
        let err = Error::Cdp("target closed".to_string());

        match err.for_page("https://example.com/b") {
            scorewatch_core::Error::Navigation { url, reason } => {
                assert_eq!(url, "https://example.com/b");
                assert!(reason.contains("target closed"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
