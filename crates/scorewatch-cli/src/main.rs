use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use scorewatch_cli::OutputFormat;
use scorewatch_cli::commands::{self, bot::BotArgs, scrape::ScrapeArgs};
use std::path::PathBuf;
use url::Url;

#[derive(Parser)]
#[command(name = "scorewatch")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Scrape live football matches and deliver them to Telegram",
    long_about = "scorewatch drives a headless Chrome through a live-score site, follows every \
                  live match link and extracts time, teams, score and status. Results can be \
                  printed, exported as CSV, or served by a Telegram bot with a daily broadcast."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape live matches once and print them
    Scrape {
        /// Listing page to start from (defaults to the site origin)
        #[arg(value_name = "URL")]
        url: Option<String>,

        /// Site origin used for link discovery
        #[arg(long, env = "SCOREWATCH_ORIGIN")]
        origin: Option<Url>,

        /// Also write the records as CSV to this file
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,

        /// Do not click the LIVE filter before collecting links
        #[arg(long)]
        no_live: bool,

        /// Detail pages loaded at the same time
        #[arg(short, long, default_value_t = 1)]
        concurrency: usize,

        /// Path to Chrome binary (auto-detected if not specified)
        #[arg(long, env = "CHROME_PATH")]
        chrome_path: Option<PathBuf>,

        /// Show the browser window
        #[arg(long)]
        headed: bool,
    },

    /// Run the Telegram bot with daily broadcast and health endpoint
    Bot {
        /// Telegram bot token
        #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
        token: String,

        /// Daily broadcast time (HH:MM, local) or "off"
        #[arg(long, env = "SCOREWATCH_SCHEDULE", default_value = scorewatch_bot::DEFAULT_SCHEDULE)]
        schedule: String,

        /// Health endpoint port
        #[arg(short, long, env = "PORT", default_value_t = scorewatch_bot::DEFAULT_PORT)]
        port: u16,

        /// Subscriber file (default: ~/.scorewatch/subscribers.json)
        #[arg(long, value_name = "FILE", conflicts_with = "no_persist")]
        subscribers: Option<PathBuf>,

        /// Keep subscribers in memory only
        #[arg(long)]
        no_persist: bool,

        /// Site origin to scrape
        #[arg(long, env = "SCOREWATCH_ORIGIN")]
        origin: Option<Url>,

        /// Path to Chrome binary (auto-detected if not specified)
        #[arg(long, env = "CHROME_PATH")]
        chrome_path: Option<PathBuf>,

        /// Browsers allowed to run at the same time
        #[arg(long, default_value_t = 2)]
        max_sessions: usize,
    },

    /// Serve only the health endpoint
    Health {
        /// Port to listen on
        #[arg(short, long, env = "PORT", default_value_t = scorewatch_bot::DEFAULT_PORT)]
        port: u16,
    },

    /// Generate shell completion scripts
    #[command(after_help = "SUPPORTED SHELLS:\n  \
        bash, zsh, fish, powershell, elvish\n\n\
        INSTALLATION:\n  \
        bash:  scorewatch completion --shell bash >> ~/.bashrc\n  \
        zsh:   scorewatch completion --shell zsh > ~/.zfunc/_scorewatch\n         \
        (add ~/.zfunc to fpath in ~/.zshrc)\n  \
        fish:  scorewatch completion --shell fish > ~/.config/fish/completions/scorewatch.fish")]
    Completion {
        /// Shell to generate completions for
        #[arg(long, value_enum)]
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    match cli.command {
        Commands::Scrape {
            url,
            origin,
            output,
            format,
            no_live,
            concurrency,
            chrome_path,
            headed,
        } => commands::scrape::execute(ScrapeArgs {
            url,
            origin,
            output,
            format,
            no_live,
            concurrency,
            chrome_path,
            headed,
        }),
        Commands::Bot {
            token,
            schedule,
            port,
            subscribers,
            no_persist,
            origin,
            chrome_path,
            max_sessions,
        } => commands::bot::execute(BotArgs {
            token,
            schedule,
            port,
            subscribers,
            no_persist,
            origin,
            chrome_path,
            max_sessions,
        }),
        Commands::Health { port } => commands::health::execute(port),
        Commands::Completion { shell } => {
            commands::completion::execute(shell, &mut Cli::command())
        }
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new(
            "scorewatch=debug,scorewatch_cli=debug,scorewatch_core=debug,scorewatch_browser=debug,scorewatch_bot=debug",
        )
    } else {
        EnvFilter::new("scorewatch=info,scorewatch_cli=info,scorewatch_bot=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}
