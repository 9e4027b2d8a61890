use crate::{Error, Result};
use chromiumoxide::browser::BrowserConfig;
use std::path::PathBuf;
use std::time::Duration;

/// Fixed viewport so the site always serves its desktop layout
pub const WINDOW_SIZE: (u32, u32) = (1920, 1080);

/// Builds the Chrome configuration for a scraping session
pub struct ChromeLauncher {
    chrome_path: PathBuf,
    profile_path: PathBuf,
    window_size: (u32, u32),
    headless: bool,
    request_timeout: Duration,
}

impl ChromeLauncher {
    pub fn new(chrome_path: PathBuf, profile_path: PathBuf) -> Self {
        Self {
            chrome_path,
            profile_path,
            window_size: WINDOW_SIZE,
            headless: true,
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Show the browser window, for debugging selectors
    pub fn headed(mut self, headed: bool) -> Self {
        self.headless = !headed;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Chrome configuration for `Browser::launch`
    pub fn config(&self) -> Result<BrowserConfig> {
        let (width, height) = self.window_size;
        let mut builder = BrowserConfig::builder()
            .chrome_executable(&self.chrome_path)
            .user_data_dir(&self.profile_path)
            .no_sandbox()
            .window_size(width, height)
            .viewport(None)
            .request_timeout(self.request_timeout)
            .args(self.build_args());

        if !self.headless {
            builder = builder.with_head();
        }

        builder
            .build()
            .map_err(|e| Error::Init(format!("Invalid browser configuration: {}", e)))
    }

    /// Extra command-line arguments on top of chromiumoxide's defaults
    fn build_args(&self) -> Vec<String> {
        vec![
            "--disable-dev-shm-usage".to_string(),
            "--disable-gpu".to_string(),
            "--no-first-run".to_string(),
            "--no-default-browser-check".to_string(),
        ]
    }
}
