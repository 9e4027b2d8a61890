use crate::{ChromeFinder, ChromeLauncher, Error, ProfileManager, Result, SettlePolicy};
use async_trait::async_trait;
use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use scorewatch_core::pipeline::ControlQuery;
use scorewatch_core::{PageSource, RenderedPage};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// How a browser session is started and how long it may wait
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    /// Explicit Chrome binary; otherwise discovered
    pub chrome_path: Option<PathBuf>,
    /// Persistent profile directory; otherwise a temporary one
    pub profile_dir: Option<PathBuf>,
    pub headed: bool,
    pub settle: SettlePolicy,
    /// Hard bound on load plus settle for a single page
    pub navigation_timeout: Duration,
    /// How long a control may take to become clickable
    pub activation_timeout: Duration,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            chrome_path: None,
            profile_dir: None,
            headed: false,
            settle: SettlePolicy::default(),
            navigation_timeout: Duration::from_secs(30),
            activation_timeout: Duration::from_secs(30),
        }
    }
}

/// One headless Chrome process with a primary tab.
///
/// Always finish with [`BrowserSession::close`]; dropping the session kills
/// Chrome but skips the graceful shutdown.
pub struct BrowserSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
    primary: Page,
    /// Last URL the primary tab was sent to
    last_url: Mutex<String>,
    options: LaunchOptions,
    _profile: ProfileManager,
}

impl BrowserSession {
    /// Launch Chrome. Every failure here is an [`Error::Init`].
    pub async fn open(options: &LaunchOptions) -> Result<Self> {
        let chrome_path = ChromeFinder::new(options.chrome_path.clone()).find()?;
        tracing::debug!("Using Chrome at {}", chrome_path.display());

        let profile = ProfileManager::for_session(options.profile_dir.clone())?;
        let config = ChromeLauncher::new(chrome_path, profile.path().to_path_buf())
            .headed(options.headed)
            .request_timeout(options.navigation_timeout)
            .config()?;

        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| Error::Init(format!("Failed to launch Chrome: {}", e)))?;

        // The handler must be polled for any CDP command to complete
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("CDP handler event error (continuing): {}", e);
                }
            }
        });

        let primary = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                let _ = browser.close().await;
                handler_task.abort();
                return Err(Error::Init(format!("Failed to open a tab: {}", e)));
            }
        };

        tracing::info!("Browser session started");

        Ok(Self {
            browser,
            handler_task,
            primary,
            last_url: Mutex::new(String::new()),
            options: options.clone(),
            _profile: profile,
        })
    }

    /// Shut Chrome down and remove a temporary profile
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            tracing::debug!("Browser close error: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            tracing::debug!("Failed waiting for Chrome to exit: {}", e);
        }
        if tokio::time::timeout(Duration::from_secs(5), &mut self.handler_task)
            .await
            .is_err()
        {
            self.handler_task.abort();
        }
        tracing::info!("Browser session closed");
    }

    /// Load `url` in the primary tab and return its settled HTML
    pub async fn navigate(&self, url: &str, landmark: Option<&str>) -> Result<RenderedPage> {
        tracing::debug!("Navigating to {}", url);
        if let Ok(mut last) = self.last_url.lock() {
            *last = url.to_string();
        }
        self.bounded(url, async {
            self.primary
                .goto(url)
                .await
                .map_err(|e| navigation_error(url, e))?;
            self.render(&self.primary, url, landmark).await
        })
        .await
    }

    /// Load `url` in a new tab, read it, and close the tab again.
    ///
    /// Load and settle share one navigation timeout. The tab is closed on
    /// every outcome.
    pub async fn fetch(&self, url: &str, landmark: Option<&str>) -> Result<RenderedPage> {
        tracing::debug!("Fetching {}", url);
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| navigation_error(url, e))?;

        let rendered = self
            .bounded(url, async {
                page.goto(url).await.map_err(|e| navigation_error(url, e))?;
                self.render(&page, url, landmark).await
            })
            .await;

        if let Err(e) = page.close().await {
            tracing::debug!("Failed to close tab for {}: {}", url, e);
        }

        rendered
    }

    /// Re-read the primary tab once it has settled again
    pub async fn snapshot(&self, landmark: Option<&str>) -> Result<RenderedPage> {
        let url = self.current_url().await;
        self.snapshot_at(&url, landmark).await
    }

    async fn snapshot_at(&self, url: &str, landmark: Option<&str>) -> Result<RenderedPage> {
        self.bounded(url, self.render(&self.primary, url, landmark))
            .await
    }

    /// URL of the primary tab
    async fn current_url(&self) -> String {
        let reported = self.primary.url().await.ok().flatten();
        let last = self
            .last_url
            .lock()
            .map(|last| last.clone())
            .unwrap_or_default();
        page_url(reported, last)
    }

    /// Click the first element matching `control` once it is clickable.
    ///
    /// Returns `false` if that does not happen within the activation timeout.
    pub async fn activate(&self, control: &ControlQuery) -> bool {
        let deadline = Instant::now() + self.options.activation_timeout;
        let poll = self.options.settle.poll_interval;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match tokio::time::timeout(remaining.max(poll), self.try_click(control)).await {
                Ok(Ok(true)) => {
                    tracing::info!("Clicked the '{}' control", control.label);
                    return true;
                }
                Ok(Ok(false)) => {}
                Ok(Err(e)) => tracing::debug!("'{}' not clickable yet: {}", control.label, e),
                Err(_) => {}
            }

            if Instant::now() >= deadline {
                tracing::warn!(
                    "'{}' control not clickable within {:?}",
                    control.label,
                    self.options.activation_timeout
                );
                return false;
            }
            tokio::time::sleep(poll).await;
        }
    }

    async fn try_click(&self, control: &ControlQuery) -> Result<bool> {
        let elements = self.primary.find_elements(control.selector.as_str()).await?;

        for element in elements {
            let text = element.inner_text().await?.unwrap_or_default();
            if !control.matches_text(&text) {
                continue;
            }

            element.scroll_into_view().await?;
            let point = element.clickable_point().await?;
            self.primary.move_mouse(point).await?;
            self.primary.click(point).await?;
            return Ok(true);
        }

        Ok(false)
    }

    async fn render(&self, page: &Page, url: &str, landmark: Option<&str>) -> Result<RenderedPage> {
        if !self.options.settle.settle(page, landmark).await {
            tracing::debug!("{} settled without its landmark", url);
        }

        let html = page.content().await.map_err(|e| navigation_error(url, e))?;
        Ok(RenderedPage::new(url, html))
    }

    async fn bounded<T, F>(&self, url: &str, work: F) -> Result<T>
    where
        F: std::future::Future<Output = Result<T>>,
    {
        within(self.options.navigation_timeout, url, work).await
    }
}

/// Run `work` under a single deadline of `after`
async fn within<T, F>(after: Duration, url: &str, work: F) -> Result<T>
where
    F: std::future::Future<Output = Result<T>>,
{
    match tokio::time::timeout(after, work).await {
        Ok(result) => result,
        Err(_) => Err(Error::Timeout {
            url: url.to_string(),
            after,
        }),
    }
}

/// Chrome's view of the tab URL, else the last navigation target.
/// Blank or `about:blank` reports fall back too.
fn page_url(reported: Option<String>, last: String) -> String {
    match reported {
        Some(url) if !url.is_empty() && url != "about:blank" => url,
        _ => last,
    }
}

fn navigation_error(url: &str, err: chromiumoxide::error::CdpError) -> Error {
    Error::Navigation {
        url: url.to_string(),
        reason: err.to_string(),
    }
}

#[async_trait]
impl PageSource for BrowserSession {
    async fn navigate(
        &self,
        url: &str,
        landmark: Option<&str>,
    ) -> scorewatch_core::Result<RenderedPage> {
        BrowserSession::navigate(self, url, landmark)
            .await
            .map_err(|e| e.for_page(url))
    }

    async fn activate(&self, control: &ControlQuery) -> bool {
        BrowserSession::activate(self, control).await
    }

    async fn snapshot(&self, landmark: Option<&str>) -> scorewatch_core::Result<RenderedPage> {
        let url = self.current_url().await;
        self.snapshot_at(&url, landmark)
            .await
            .map_err(|e| e.for_page(&url))
    }

    async fn fetch(
        &self,
        url: &str,
        landmark: Option<&str>,
    ) -> scorewatch_core::Result<RenderedPage> {
        BrowserSession::fetch(self, url, landmark)
            .await
            .map_err(|e| e.for_page(url))
    }
}
