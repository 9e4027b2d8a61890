//! Headless Chrome sessions for the scrape pipeline.
//!
//! [`BrowserSession`] implements [`scorewatch_core::PageSource`]; [`scrape`]
//! wraps a whole run so the browser is closed on every exit path.

mod chrome_finder;
mod error;
mod launcher;
mod profile;
mod session;
mod settle;

pub use chrome_finder::ChromeFinder;
pub use error::{Error, Result};
pub use launcher::{ChromeLauncher, WINDOW_SIZE};
pub use profile::ProfileManager;
pub use session::{BrowserSession, LaunchOptions};
pub use settle::SettlePolicy;

use scorewatch_core::pipeline::{NoopObserver, ScrapeObserver};
use scorewatch_core::{Orchestrator, ScrapeReport};

/// Open a session, run the orchestrator from `entry_url`, and close the session.
///
/// Fails with [`Error::Init`] if Chrome cannot be started, or with
/// [`Error::Scrape`] if the entry page cannot be loaded.
pub async fn scrape(
    options: &LaunchOptions,
    orchestrator: &Orchestrator,
    entry_url: &str,
) -> Result<ScrapeReport> {
    scrape_with_observer(options, orchestrator, entry_url, &NoopObserver).await
}

pub async fn scrape_with_observer(
    options: &LaunchOptions,
    orchestrator: &Orchestrator,
    entry_url: &str,
    observer: &dyn ScrapeObserver,
) -> Result<ScrapeReport> {
    let session = BrowserSession::open(options).await?;
    let result = orchestrator
        .run_with_observer(&session, entry_url, observer)
        .await;
    session.close().await;

    Ok(result?)
}
