//! Two-level scrape over a [`PageSource`].
//!
//! The orchestrator only sees rendered HTML; how pages are loaded (headless
//! browser, fixtures in tests) is behind the [`PageSource`] trait.

mod orchestrator;
mod report;

pub use orchestrator::{NoopObserver, Orchestrator, ScrapeObserver, ScrapeOptions};
pub use report::{LinkFailure, ScrapeReport};

use crate::Result;
use async_trait::async_trait;

/// HTML of a page after it finished rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub url: String,
    pub html: String,
}

impl RenderedPage {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
        }
    }
}

/// A clickable control identified by selector and visible label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlQuery {
    pub selector: String,
    pub label: String,
}

impl ControlQuery {
    pub fn new(selector: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            label: label.into(),
        }
    }

    /// Whether an element's visible text carries the label
    pub fn matches_text(&self, text: &str) -> bool {
        text.contains(&self.label)
    }
}

/// Something that can load and render pages.
///
/// `navigate`, `activate` and `snapshot` share one primary tab and are only
/// called sequentially. `fetch` loads into an isolated tab and may be called
/// concurrently.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Load a URL into the primary tab, waiting for `landmark` if given
    async fn navigate(&self, url: &str, landmark: Option<&str>) -> Result<RenderedPage>;

    /// Click a control on the primary tab; `false` if it never became clickable
    async fn activate(&self, control: &ControlQuery) -> bool;

    /// Re-read the primary tab, e.g. after an activation
    async fn snapshot(&self, landmark: Option<&str>) -> Result<RenderedPage>;

    /// Load a URL into a fresh tab that is closed afterwards
    async fn fetch(&self, url: &str, landmark: Option<&str>) -> Result<RenderedPage>;
}
