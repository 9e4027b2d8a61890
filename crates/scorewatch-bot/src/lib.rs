// Telegram delivery, daily broadcast and liveness endpoint

pub mod error;
pub mod handler;
pub mod runner;
pub mod schedule;
pub mod server;
pub mod subscribers;
pub mod telegram;

pub use error::{Error, Result, ScrapeFailure};
pub use handler::{BotHandler, BrowserScraper, Command, MatchScraper};
pub use runner::{BotConfig, run_bot, run_health};
pub use schedule::{DEFAULT_SCHEDULE, DailySchedule};
pub use server::{DEFAULT_PORT, HealthServer};
pub use subscribers::{JsonFileRegistry, MemoryRegistry, SubscriberRegistry};
pub use telegram::{ChatSender, TelegramClient};
