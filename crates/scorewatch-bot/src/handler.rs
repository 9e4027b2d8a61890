use crate::error::ScrapeFailure;
use crate::subscribers::SubscriberRegistry;
use crate::telegram::ChatSender;
use crate::{Error, Result};
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use scorewatch_browser::LaunchOptions;
use scorewatch_core::export::{CsvExporter, DEFAULT_CSV_FILE, format_record, format_summary};
use scorewatch_core::{MatchRecord, Orchestrator};
use std::sync::Arc;
use tokio::sync::Semaphore;
use url::Url;

pub const WELCOME_MESSAGE: &str = "Welcome! You are now subscribed to live match updates.\n\
     Send me a URL to scrape live match details, or /help for the full list of commands.";

pub const HELP_MESSAGE: &str = "/start - subscribe to the daily live match summary\n\
     /stop - unsubscribe\n\
     /live - live matches right now\n\
     /broadcast - send the live summary to every subscriber\n\
     /help - this message\n\
     Any other text is treated as a page URL to scrape.";

pub const UNSUBSCRIBED_MESSAGE: &str = "You will no longer receive match updates.";
pub const INVALID_URL_MESSAGE: &str = "Please send a valid http(s) URL.";
pub const NO_LINKS_MESSAGE: &str = "No live match links found.";
pub const CSV_READY_MESSAGE: &str = "Scraping completed! Sending you the CSV file.";
pub const CSV_FAILED_MESSAGE: &str = "An error occurred while sending the CSV file.";
pub const INIT_FAILED_MESSAGE: &str = "Browser could not be initialized.";
pub const SCRAPE_FAILED_MESSAGE: &str = "An error occurred during scraping. Please try again.";

lazy_static! {
    static ref COMMAND_RE: Regex = Regex::new(r"^/([A-Za-z0-9_]+)(?:@\w+)?(?:\s|$)")
        .expect("command pattern is valid");
}

/// What an incoming chat message asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
    Help,
    Live,
    Broadcast,
    Unknown(String),
    /// Plain text, taken as a page to scrape
    Scrape(String),
}

impl Command {
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let Some(caps) = COMMAND_RE.captures(text) else {
            return Some(Command::Scrape(text.to_string()));
        };

        let name = caps[1].to_ascii_lowercase();
        Some(match name.as_str() {
            "start" => Command::Start,
            "stop" => Command::Stop,
            "help" => Command::Help,
            "live" => Command::Live,
            "broadcast" => Command::Broadcast,
            _ => Command::Unknown(name),
        })
    }
}

/// Produces match records for a page
#[async_trait]
pub trait MatchScraper: Send + Sync {
    async fn scrape(&self, url: &str) -> std::result::Result<Vec<MatchRecord>, ScrapeFailure>;
}

/// Scrapes with a fresh headless browser per request
pub struct BrowserScraper {
    orchestrator: Orchestrator,
    launch: LaunchOptions,
    sessions: Semaphore,
}

impl BrowserScraper {
    /// At most `max_sessions` browsers run at once
    pub fn new(orchestrator: Orchestrator, launch: LaunchOptions, max_sessions: usize) -> Self {
        Self {
            orchestrator,
            launch,
            sessions: Semaphore::new(max_sessions.max(1)),
        }
    }
}

#[async_trait]
impl MatchScraper for BrowserScraper {
    async fn scrape(&self, url: &str) -> std::result::Result<Vec<MatchRecord>, ScrapeFailure> {
        let _permit = self
            .sessions
            .acquire()
            .await
            .map_err(|e| ScrapeFailure::Other(e.to_string()))?;

        let report = scorewatch_browser::scrape(&self.launch, &self.orchestrator, url).await?;
        tracing::info!(
            "Scraped {} records from {} ({} failed links)",
            report.records.len(),
            url,
            report.failures.len()
        );
        Ok(report.into_records())
    }
}

/// Turns chat messages into scrapes and replies
pub struct BotHandler {
    scraper: Arc<dyn MatchScraper>,
    chat: Arc<dyn ChatSender>,
    subscribers: Arc<dyn SubscriberRegistry>,
    default_url: String,
}

impl BotHandler {
    pub fn new(
        scraper: Arc<dyn MatchScraper>,
        chat: Arc<dyn ChatSender>,
        subscribers: Arc<dyn SubscriberRegistry>,
        default_url: impl Into<String>,
    ) -> Self {
        Self {
            scraper,
            chat,
            subscribers,
            default_url: default_url.into(),
        }
    }

    pub async fn handle_message(&self, chat_id: i64, text: &str) -> Result<()> {
        let Some(command) = Command::parse(text) else {
            return Ok(());
        };
        tracing::debug!("Chat {} sent {:?}", chat_id, command);

        match command {
            Command::Start => {
                self.subscribers.add(chat_id).await?;
                self.chat.send_text(chat_id, WELCOME_MESSAGE).await
            }
            Command::Stop => {
                self.subscribers.remove(chat_id).await?;
                self.chat.send_text(chat_id, UNSUBSCRIBED_MESSAGE).await
            }
            Command::Help | Command::Unknown(_) => self.chat.send_text(chat_id, HELP_MESSAGE).await,
            Command::Live => self.send_live(chat_id).await,
            Command::Broadcast => match self.broadcast().await {
                Ok(sent) => {
                    self.chat
                        .send_text(chat_id, &format!("Broadcast sent to {} subscribers.", sent))
                        .await
                }
                Err(Error::Scrape(failure)) => self.report_failure(chat_id, failure).await,
                Err(e) => Err(e),
            },
            Command::Scrape(url) => self.scrape_url(chat_id, &url).await,
        }
    }

    async fn send_live(&self, chat_id: i64) -> Result<()> {
        match self.scraper.scrape(&self.default_url).await {
            Ok(records) => self.chat.send_text(chat_id, &format_summary(&records)).await,
            Err(failure) => self.report_failure(chat_id, failure).await,
        }
    }

    /// Scrape the default page and send the summary to every subscriber.
    ///
    /// Returns how many chats received it. If the scrape fails nothing is
    /// sent and the failure is returned as [`Error::Scrape`].
    pub async fn broadcast(&self) -> Result<usize> {
        let records = self.scraper.scrape(&self.default_url).await?;

        let summary = format_summary(&records);
        let mut sent = 0;
        for chat_id in self.subscribers.all().await? {
            match self.chat.send_text(chat_id, &summary).await {
                Ok(()) => sent += 1,
                Err(e) => tracing::warn!("Failed to send broadcast to {}: {}", chat_id, e),
            }
        }

        tracing::info!("Broadcast {} records to {} chats", records.len(), sent);
        Ok(sent)
    }

    async fn scrape_url(&self, chat_id: i64, text: &str) -> Result<()> {
        let url = match Url::parse(text) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => url,
            _ => return self.chat.send_text(chat_id, INVALID_URL_MESSAGE).await,
        };

        self.chat
            .send_text(chat_id, &format!("Scraping live matches from: {}", url))
            .await?;

        let records = match self.scraper.scrape(url.as_str()).await {
            Ok(records) => records,
            Err(failure) => return self.report_failure(chat_id, failure).await,
        };

        if records.is_empty() {
            return self.chat.send_text(chat_id, NO_LINKS_MESSAGE).await;
        }

        self.chat.send_text(chat_id, CSV_READY_MESSAGE).await?;
        let delivered = match CsvExporter::to_bytes(&records) {
            Ok(bytes) => self.chat.send_document(chat_id, DEFAULT_CSV_FILE, bytes).await,
            Err(e) => Err(e.into()),
        };
        if let Err(e) = delivered {
            tracing::warn!("CSV delivery to {} failed: {}", chat_id, e);
            self.chat.send_text(chat_id, CSV_FAILED_MESSAGE).await?;
        }

        for record in &records {
            if let Err(e) = self.chat.send_text(chat_id, &format_record(record)).await {
                tracing::warn!(
                    "Failed to send {} to {}: {}",
                    record.source_link(),
                    chat_id,
                    e
                );
            }
        }
        Ok(())
    }

    async fn report_failure(&self, chat_id: i64, failure: ScrapeFailure) -> Result<()> {
        let reply = match &failure {
            ScrapeFailure::Init(reason) => {
                tracing::error!("Browser could not be initialized: {}", reason);
                INIT_FAILED_MESSAGE
            }
            ScrapeFailure::Other(reason) => {
                tracing::error!("Scrape failed: {}", reason);
                SCRAPE_FAILED_MESSAGE
            }
        };
        self.chat.send_text(chat_id, reply).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscribers::MemoryRegistry;
    use scorewatch_core::record::RecordFields;
    use tokio::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    enum Sent {
        Text(i64, String),
        Document(i64, String, usize),
    }

    #[derive(Default)]
    struct RecordingChat {
        sent: Mutex<Vec<Sent>>,
        fail_documents: bool,
        /// Texts containing this are rejected instead of recorded
        fail_texts_with: Option<&'static str>,
    }

    impl RecordingChat {
        async fn texts(&self, chat_id: i64) -> Vec<String> {
            self.sent
                .lock()
                .await
                .iter()
                .filter_map(|s| match s {
                    Sent::Text(id, text) if *id == chat_id => Some(text.clone()),
                    _ => None,
                })
                .collect()
        }
    }

    #[async_trait]
    impl ChatSender for RecordingChat {
        async fn send_text(&self, chat_id: i64, text: &str) -> Result<()> {
            if self.fail_texts_with.is_some_and(|needle| text.contains(needle)) {
                return Err(crate::Error::Telegram("message rejected".to_string()));
            }
            self.sent.lock().await.push(Sent::Text(chat_id, text.to_string()));
            Ok(())
        }

        async fn send_document(&self, chat_id: i64, file_name: &str, bytes: Vec<u8>) -> Result<()> {
            if self.fail_documents {
                return Err(crate::Error::Telegram("upload rejected".to_string()));
            }
            self.sent
                .lock()
                .await
                .push(Sent::Document(chat_id, file_name.to_string(), bytes.len()));
            Ok(())
        }
    }

    enum Outcome {
        Records(Vec<MatchRecord>),
        InitFailure,
        OtherFailure,
    }

    struct FakeScraper {
        outcome: Outcome,
        calls: Mutex<Vec<String>>,
    }

    impl FakeScraper {
        fn new(outcome: Outcome) -> Arc<Self> {
            Arc::new(Self {
                outcome,
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl MatchScraper for FakeScraper {
        async fn scrape(&self, url: &str) -> std::result::Result<Vec<MatchRecord>, ScrapeFailure> {
            self.calls.lock().await.push(url.to_string());
            match &self.outcome {
                Outcome::Records(records) => Ok(records.clone()),
                Outcome::InitFailure => Err(ScrapeFailure::Init("chrome missing".to_string())),
                Outcome::OtherFailure => Err(ScrapeFailure::Other("entry page timed out".to_string())),
            }
        }
    }

    fn record(home: &str, away: &str) -> MatchRecord {
        MatchRecord::new(
            RecordFields {
                match_time: Some("15.03. 20:45".to_string()),
                home_team: Some(home.to_string()),
                away_team: Some(away.to_string()),
                home_score: Some("1".to_string()),
                away_score: Some("0".to_string()),
                status: Some("2nd half".to_string()),
            },
            format!("https://example.test/match/{}", home),
        )
        .unwrap()
    }

    fn handler(
        scraper: Arc<FakeScraper>,
        chat: Arc<RecordingChat>,
        subscribers: Arc<MemoryRegistry>,
    ) -> BotHandler {
        BotHandler::new(scraper, chat, subscribers, "https://example.test/")
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("/start"), Some(Command::Start));
        assert_eq!(Command::parse("/live@scorewatch_bot"), Some(Command::Live));
        assert_eq!(Command::parse("/HELP please"), Some(Command::Help));
        assert_eq!(
            Command::parse("/nope"),
            Some(Command::Unknown("nope".to_string()))
        );
        assert_eq!(
            Command::parse("  https://example.test/football  "),
            Some(Command::Scrape("https://example.test/football".to_string()))
        );
        assert_eq!(Command::parse("   "), None);
    }

    #[test]
    fn test_slash_without_name_is_plain_text() {
        assert_eq!(Command::parse("/"), Some(Command::Scrape("/".to_string())));
    }

    #[tokio::test]
    async fn test_start_subscribes_and_welcomes() {
        let chat = Arc::new(RecordingChat::default());
        let subs = Arc::new(MemoryRegistry::new());
        let bot = handler(FakeScraper::new(Outcome::Records(vec![])), chat.clone(), subs.clone());

        bot.handle_message(7, "/start").await.unwrap();
        bot.handle_message(7, "/start").await.unwrap();

        assert_eq!(subs.all().await.unwrap(), vec![7]);
        assert_eq!(chat.texts(7).await, vec![WELCOME_MESSAGE, WELCOME_MESSAGE]);
    }

    #[tokio::test]
    async fn test_stop_unsubscribes() {
        let chat = Arc::new(RecordingChat::default());
        let subs = Arc::new(MemoryRegistry::new());
        let bot = handler(FakeScraper::new(Outcome::Records(vec![])), chat.clone(), subs.clone());

        bot.handle_message(7, "/start").await.unwrap();
        bot.handle_message(7, "/stop").await.unwrap();

        assert!(subs.all().await.unwrap().is_empty());
        assert_eq!(chat.texts(7).await.last().unwrap(), UNSUBSCRIBED_MESSAGE);
    }

    #[tokio::test]
    async fn test_live_sends_summary_of_default_page() {
        let chat = Arc::new(RecordingChat::default());
        let scraper = FakeScraper::new(Outcome::Records(vec![record("Inter", "Milan")]));
        let bot = handler(scraper.clone(), chat.clone(), Arc::new(MemoryRegistry::new()));

        bot.handle_message(3, "/live").await.unwrap();

        assert_eq!(chat.texts(3).await, vec!["Inter vs Milan: 2nd half"]);
        assert_eq!(*scraper.calls.lock().await, vec!["https://example.test/"]);
    }

    #[tokio::test]
    async fn test_live_without_matches() {
        let chat = Arc::new(RecordingChat::default());
        let bot = handler(
            FakeScraper::new(Outcome::Records(vec![])),
            chat.clone(),
            Arc::new(MemoryRegistry::new()),
        );

        bot.handle_message(3, "/live").await.unwrap();

        assert_eq!(chat.texts(3).await, vec!["No live matches found."]);
    }

    #[tokio::test]
    async fn test_url_sends_csv_then_one_message_per_record() {
        let chat = Arc::new(RecordingChat::default());
        let scraper = FakeScraper::new(Outcome::Records(vec![
            record("Inter", "Milan"),
            record("Roma", "Lazio"),
        ]));
        let bot = handler(scraper.clone(), chat.clone(), Arc::new(MemoryRegistry::new()));

        bot.handle_message(9, "https://example.test/football/")
            .await
            .unwrap();

        let sent = chat.sent.lock().await.clone();
        assert_eq!(sent.len(), 5);
        assert_eq!(
            sent[0],
            Sent::Text(
                9,
                "Scraping live matches from: https://example.test/football/".to_string()
            )
        );
        assert_eq!(sent[1], Sent::Text(9, CSV_READY_MESSAGE.to_string()));
        assert!(matches!(&sent[2], Sent::Document(9, name, len) if name == DEFAULT_CSV_FILE && *len > 0));
        assert_eq!(
            sent[3],
            Sent::Text(
                9,
                "15.03. 20:45 - Inter vs Milan\nScore: 1 - 0\nStatus: 2nd half\nLink: https://example.test/match/Inter"
                    .to_string()
            )
        );
        assert!(matches!(&sent[4], Sent::Text(9, text) if text.contains("Roma vs Lazio")));
        assert_eq!(
            *scraper.calls.lock().await,
            vec!["https://example.test/football/"]
        );
    }

    #[tokio::test]
    async fn test_url_without_matches() {
        let chat = Arc::new(RecordingChat::default());
        let bot = handler(
            FakeScraper::new(Outcome::Records(vec![])),
            chat.clone(),
            Arc::new(MemoryRegistry::new()),
        );

        bot.handle_message(9, "https://example.test/").await.unwrap();

        assert_eq!(chat.texts(9).await.last().unwrap(), NO_LINKS_MESSAGE);
    }

    #[tokio::test]
    async fn test_failed_csv_upload_still_sends_records() {
        let chat = Arc::new(RecordingChat {
            fail_documents: true,
            ..RecordingChat::default()
        });
        let bot = handler(
            FakeScraper::new(Outcome::Records(vec![record("Inter", "Milan")])),
            chat.clone(),
            Arc::new(MemoryRegistry::new()),
        );

        bot.handle_message(9, "https://example.test/").await.unwrap();

        let texts = chat.texts(9).await;
        assert!(texts.contains(&CSV_FAILED_MESSAGE.to_string()));
        assert!(texts.last().unwrap().contains("Inter vs Milan"));
    }

    #[tokio::test]
    async fn test_invalid_url_is_not_scraped() {
        let chat = Arc::new(RecordingChat::default());
        let scraper = FakeScraper::new(Outcome::Records(vec![]));
        let bot = handler(scraper.clone(), chat.clone(), Arc::new(MemoryRegistry::new()));

        bot.handle_message(9, "hello there").await.unwrap();
        bot.handle_message(9, "ftp://example.test/").await.unwrap();

        assert_eq!(chat.texts(9).await, vec![INVALID_URL_MESSAGE, INVALID_URL_MESSAGE]);
        assert!(scraper.calls.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_init_failure_reply() {
        let chat = Arc::new(RecordingChat::default());
        let bot = handler(
            FakeScraper::new(Outcome::InitFailure),
            chat.clone(),
            Arc::new(MemoryRegistry::new()),
        );

        bot.handle_message(1, "https://example.test/").await.unwrap();

        assert_eq!(chat.texts(1).await.last().unwrap(), INIT_FAILED_MESSAGE);
    }

    #[tokio::test]
    async fn test_other_failure_reply() {
        let chat = Arc::new(RecordingChat::default());
        let bot = handler(
            FakeScraper::new(Outcome::OtherFailure),
            chat.clone(),
            Arc::new(MemoryRegistry::new()),
        );

        bot.handle_message(1, "/live").await.unwrap();

        assert_eq!(chat.texts(1).await, vec![SCRAPE_FAILED_MESSAGE]);
    }

    #[tokio::test]
    async fn test_broadcast_reaches_every_subscriber() {
        let chat = Arc::new(RecordingChat::default());
        let subs = Arc::new(MemoryRegistry::new());
        subs.add(1).await.unwrap();
        subs.add(2).await.unwrap();
        let bot = handler(
            FakeScraper::new(Outcome::Records(vec![record("Inter", "Milan")])),
            chat.clone(),
            subs,
        );

        assert_eq!(bot.broadcast().await.unwrap(), 2);
        assert_eq!(chat.texts(1).await, vec!["Inter vs Milan: 2nd half"]);
        assert_eq!(chat.texts(2).await, vec!["Inter vs Milan: 2nd half"]);
    }

    #[tokio::test]
    async fn test_broadcast_command_confirms_to_sender() {
        let chat = Arc::new(RecordingChat::default());
        let subs = Arc::new(MemoryRegistry::new());
        subs.add(1).await.unwrap();
        let bot = handler(
            FakeScraper::new(Outcome::Records(vec![])),
            chat.clone(),
            subs,
        );

        bot.handle_message(5, "/broadcast").await.unwrap();

        assert_eq!(chat.texts(1).await, vec!["No live matches found."]);
        assert_eq!(
            chat.texts(5).await,
            vec!["Broadcast sent to 1 subscribers."]
        );
    }

    #[tokio::test]
    async fn test_broadcast_failure_sends_nothing() {
        let chat = Arc::new(RecordingChat::default());
        let subs = Arc::new(MemoryRegistry::new());
        subs.add(1).await.unwrap();
        let bot = handler(FakeScraper::new(Outcome::OtherFailure), chat.clone(), subs);

        let err = bot.broadcast().await.unwrap_err();
        assert!(matches!(err, Error::Scrape(ScrapeFailure::Other(_))));
        assert!(chat.sent.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_broadcast_command_reports_init_failure_to_sender() {
        let chat = Arc::new(RecordingChat::default());
        let subs = Arc::new(MemoryRegistry::new());
        subs.add(1).await.unwrap();
        let bot = handler(FakeScraper::new(Outcome::InitFailure), chat.clone(), subs);

        bot.handle_message(5, "/broadcast").await.unwrap();

        assert_eq!(chat.texts(5).await, vec![INIT_FAILED_MESSAGE]);
        assert!(chat.texts(1).await.is_empty());
    }

    #[tokio::test]
    async fn test_broadcast_command_reports_other_failure_to_sender() {
        let chat = Arc::new(RecordingChat::default());
        let bot = handler(
            FakeScraper::new(Outcome::OtherFailure),
            chat.clone(),
            Arc::new(MemoryRegistry::new()),
        );

        bot.handle_message(5, "/broadcast").await.unwrap();

        assert_eq!(chat.texts(5).await, vec![SCRAPE_FAILED_MESSAGE]);
    }

    #[tokio::test]
    async fn test_failed_record_message_does_not_drop_the_rest() {
        let chat = Arc::new(RecordingChat {
            fail_texts_with: Some("Inter vs Milan"),
            ..RecordingChat::default()
        });
        let bot = handler(
            FakeScraper::new(Outcome::Records(vec![
                record("Inter", "Milan"),
                record("Roma", "Lazio"),
            ])),
            chat.clone(),
            Arc::new(MemoryRegistry::new()),
        );

        bot.handle_message(9, "https://example.test/").await.unwrap();

        let texts = chat.texts(9).await;
        assert!(texts.last().unwrap().contains("Roma vs Lazio"));
        assert!(!texts.iter().any(|t| t.contains("Inter vs Milan")));
    }
}
