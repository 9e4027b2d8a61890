use crate::handler::{BotHandler, BrowserScraper};
use crate::schedule::DailySchedule;
use crate::server::{DEFAULT_PORT, HealthServer};
use crate::subscribers::{JsonFileRegistry, MemoryRegistry, SubscriberRegistry};
use crate::telegram::TelegramClient;
use crate::{Error, Result};
use chrono::Local;
use scorewatch_browser::LaunchOptions;
use scorewatch_core::pipeline::ScrapeOptions;
use scorewatch_core::{Orchestrator, SiteLayout};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Back-off after a failed `getUpdates` call
const POLL_RETRY: Duration = Duration::from_secs(5);

/// Everything `run_bot` needs
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub token: String,
    pub layout: SiteLayout,
    pub scrape: ScrapeOptions,
    pub launch: LaunchOptions,
    /// `None` disables the daily broadcast
    pub schedule: Option<DailySchedule>,
    pub port: u16,
    /// `None` keeps subscribers in memory only
    pub subscribers_path: Option<PathBuf>,
    /// Browsers allowed to run at the same time
    pub max_sessions: usize,
}

impl BotConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            layout: SiteLayout::default(),
            scrape: ScrapeOptions::default(),
            launch: LaunchOptions::default(),
            schedule: Some(DailySchedule::default()),
            port: DEFAULT_PORT,
            subscribers_path: JsonFileRegistry::default_path(),
            max_sessions: 2,
        }
    }
}

/// Run the chat loop, the daily broadcast and the health endpoint until Ctrl+C
pub async fn run_bot(config: BotConfig) -> Result<()> {
    let client = Arc::new(TelegramClient::new(&config.token)?);

    let subscribers: Arc<dyn SubscriberRegistry> = match &config.subscribers_path {
        Some(path) => {
            let registry = JsonFileRegistry::open(path).await?;
            tracing::info!("Subscribers stored in {}", registry.path().display());
            Arc::new(registry)
        }
        None => Arc::new(MemoryRegistry::new()),
    };

    let default_url = config.layout.origin.to_string();
    let orchestrator = Orchestrator::new(config.layout.clone(), config.scrape.clone())?;
    let scraper = Arc::new(BrowserScraper::new(
        orchestrator,
        config.launch.clone(),
        config.max_sessions,
    ));
    let handler = Arc::new(BotHandler::new(
        scraper,
        client.clone(),
        subscribers,
        default_url,
    ));

    let health = HealthServer::bind(config.port).await?;
    let (stop_tx, stop_rx) = tokio::sync::watch::channel(false);
    let health_task = tokio::spawn(health.serve(async move {
        let mut stop_rx = stop_rx;
        let _ = stop_rx.wait_for(|stopped| *stopped).await;
    }));

    let result = tokio::select! {
        r = poll_updates(&client, handler.clone()) => r,
        r = run_schedule(config.schedule, handler.clone()) => r,
        r = tokio::signal::ctrl_c() => {
            tracing::info!("Received Ctrl+C, shutting down...");
            r.map_err(Error::from)
        }
    };

    let _ = stop_tx.send(true);
    match health_task.await {
        Ok(Err(e)) => tracing::warn!("Health endpoint failed: {}", e),
        Err(e) => tracing::warn!("Health endpoint task panicked: {}", e),
        Ok(Ok(())) => {}
    }

    result
}

/// Serve only the health endpoint until Ctrl+C
pub async fn run_health(port: u16) -> Result<()> {
    let server = HealthServer::bind(port).await?;
    server
        .serve(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Received Ctrl+C, shutting down...");
        })
        .await
}

/// Long-poll Telegram and hand each text message to its own task
pub async fn poll_updates(client: &TelegramClient, handler: Arc<BotHandler>) -> Result<()> {
    tracing::info!("✓ Polling Telegram for messages");
    let mut offset = 0;

    loop {
        let updates = match client.get_updates(offset).await {
            Ok(updates) => updates,
            Err(e) => {
                tracing::warn!("getUpdates failed, retrying in {:?}: {}", POLL_RETRY, e);
                tokio::time::sleep(POLL_RETRY).await;
                continue;
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);

            let Some(message) = update.message else {
                continue;
            };
            let Some(text) = message.text else {
                continue;
            };

            let chat_id = message.chat.id;
            let handler = handler.clone();
            tokio::spawn(async move {
                if let Err(e) = handler.handle_message(chat_id, &text).await {
                    tracing::warn!("Failed to handle message from {}: {}", chat_id, e);
                }
            });
        }
    }
}

/// Broadcast once a day at the scheduled local time; never returns if disabled
pub async fn run_schedule(schedule: Option<DailySchedule>, handler: Arc<BotHandler>) -> Result<()> {
    let Some(schedule) = schedule else {
        return std::future::pending().await;
    };

    loop {
        let now = Local::now();
        let next = schedule.next_run(&now);
        let wait = (next - now).to_std().unwrap_or_default();
        tracing::info!("Next broadcast at {}", next.format("%Y-%m-%d %H:%M"));

        tokio::time::sleep(wait).await;
        match handler.broadcast().await {
            Ok(sent) => tracing::info!("Scheduled broadcast reached {} chats", sent),
            Err(e) => tracing::error!("Scheduled broadcast failed: {}", e),
        }
    }
}
