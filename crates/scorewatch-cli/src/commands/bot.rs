use anyhow::{Context, Result};
use scorewatch_bot::{BotConfig, DailySchedule, JsonFileRegistry};
use scorewatch_core::SiteLayout;
use std::path::PathBuf;
use url::Url;

#[derive(Debug, Clone)]
pub struct BotArgs {
    pub token: String,
    /// `HH:MM`, or `off` to disable the daily broadcast
    pub schedule: String,
    pub port: u16,
    pub subscribers: Option<PathBuf>,
    /// Keep subscribers in memory only
    pub no_persist: bool,
    pub origin: Option<Url>,
    pub chrome_path: Option<PathBuf>,
    pub max_sessions: usize,
}

pub fn execute(args: BotArgs) -> Result<()> {
    let config = build_config(args)?;

    match config.schedule {
        Some(schedule) => tracing::info!("Daily broadcast at {}", schedule),
        None => tracing::info!("Daily broadcast disabled"),
    }

    super::runtime()?.block_on(scorewatch_bot::run_bot(config))?;
    Ok(())
}

fn build_config(args: BotArgs) -> Result<BotConfig> {
    let mut config = BotConfig::new(args.token);

    config.schedule = if args.schedule.eq_ignore_ascii_case("off") {
        None
    } else {
        Some(args.schedule.parse::<DailySchedule>()?)
    };
    config.port = args.port;
    config.subscribers_path = if args.no_persist {
        None
    } else {
        match args.subscribers {
            Some(path) => Some(path),
            None => Some(
                JsonFileRegistry::default_path()
                    .context("Could not determine home directory; pass --subscribers")?,
            ),
        }
    };
    if let Some(origin) = args.origin {
        config.layout = SiteLayout::with_origin(origin);
    }
    config.launch.chrome_path = args.chrome_path;
    config.max_sessions = args.max_sessions.max(1);

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> BotArgs {
        BotArgs {
            token: "123:abc".to_string(),
            schedule: "07:30".to_string(),
            port: 8080,
            subscribers: Some(PathBuf::from("/tmp/subs.json")),
            no_persist: false,
            origin: None,
            chrome_path: None,
            max_sessions: 0,
        }
    }

    #[test]
    fn test_build_config_from_args() {
        let config = build_config(args()).unwrap();

        assert_eq!(config.schedule.unwrap().to_string(), "07:30");
        assert_eq!(config.port, 8080);
        assert_eq!(config.subscribers_path, Some(PathBuf::from("/tmp/subs.json")));
        assert_eq!(config.max_sessions, 1);
    }

    #[test]
    fn test_schedule_can_be_disabled() {
        let config = build_config(BotArgs {
            schedule: "OFF".to_string(),
            ..args()
        })
        .unwrap();
        assert!(config.schedule.is_none());
    }

    #[test]
    fn test_bad_schedule_is_rejected() {
        let err = build_config(BotArgs {
            schedule: "7 o'clock".to_string(),
            ..args()
        })
        .unwrap_err();
        assert!(err.to_string().contains("expected HH:MM"));
    }

    #[test]
    fn test_no_persist_uses_memory() {
        let config = build_config(BotArgs {
            no_persist: true,
            ..args()
        })
        .unwrap();
        assert!(config.subscribers_path.is_none());
    }

    #[test]
    fn test_origin_override() {
        let origin = Url::parse("https://scores.example.test/").unwrap();
        let config = build_config(BotArgs {
            origin: Some(origin.clone()),
            ..args()
        })
        .unwrap();
        assert_eq!(config.layout.origin, origin);
    }
}
