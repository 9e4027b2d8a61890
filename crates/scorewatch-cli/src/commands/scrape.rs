use crate::OutputFormat;
use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use scorewatch_browser::LaunchOptions;
use scorewatch_core::export::CsvExporter;
use scorewatch_core::pipeline::{ScrapeObserver, ScrapeOptions};
use scorewatch_core::record::COLUMNS;
use scorewatch_core::{MatchRecord, Orchestrator, ScrapeReport, SiteLayout};
use std::io;
use std::path::PathBuf;
use url::Url;

/// Inputs of one `scorewatch scrape` run
#[derive(Debug, Clone)]
pub struct ScrapeArgs {
    /// Listing page; defaults to the site origin
    pub url: Option<String>,
    pub origin: Option<Url>,
    pub output: Option<PathBuf>,
    pub format: OutputFormat,
    pub no_live: bool,
    pub concurrency: usize,
    pub chrome_path: Option<PathBuf>,
    pub headed: bool,
}

pub fn execute(args: ScrapeArgs) -> Result<()> {
    let layout = args
        .origin
        .clone()
        .map(SiteLayout::with_origin)
        .unwrap_or_default();

    let entry_url = match &args.url {
        Some(url) => Url::parse(url)
            .with_context(|| format!("Invalid URL: {}", url))?
            .to_string(),
        None => layout.origin.to_string(),
    };

    let orchestrator = Orchestrator::new(
        layout,
        ScrapeOptions {
            activate_live: !args.no_live,
            max_concurrency: args.concurrency.max(1),
        },
    )?;

    let launch = LaunchOptions {
        chrome_path: args.chrome_path.clone(),
        headed: args.headed,
        ..LaunchOptions::default()
    };

    let progress = ScrapeProgress::new();
    let report = super::runtime()?.block_on(scorewatch_browser::scrape_with_observer(
        &launch,
        &orchestrator,
        &entry_url,
        &progress,
    ));
    progress.finish();
    let report = report?;

    if let Some(path) = &args.output {
        CsvExporter::to_file(&report.records, path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        eprintln!(
            "{} Saved {} records to {}",
            style("✓").green(),
            report.records.len(),
            path.display()
        );
    }

    match args.format {
        OutputFormat::Table => output_table(&report),
        OutputFormat::Json => output_json(&report)?,
        OutputFormat::Csv => CsvExporter::to_writer(&report.records, io::stdout().lock())?,
    }

    for failure in &report.failures {
        tracing::warn!("Skipped {}: {}", failure.url, failure.reason);
    }

    Ok(())
}

/// Progress bar over the detail pages of a run
struct ScrapeProgress {
    bar: ProgressBar,
}

impl ScrapeProgress {
    fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_message("Loading listing page");
        bar.enable_steady_tick(std::time::Duration::from_millis(120));
        Self { bar }
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ScrapeObserver for ScrapeProgress {
    fn links_discovered(&self, count: usize) {
        if let Ok(bar_style) =
            ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {wide_msg}")
        {
            self.bar.set_style(bar_style.progress_chars("=> "));
        }
        self.bar.set_length(count as u64);
        self.bar.set_message("");
    }

    fn link_finished(&self, url: &str) {
        self.bar.inc(1);
        self.bar.set_message(url.to_string());
    }
}

fn output_json(report: &ScrapeReport) -> Result<()> {
    let json_str = serde_json::to_string_pretty(&report.records)?;
    println!("{}", json_str);
    Ok(())
}

fn output_table(report: &ScrapeReport) {
    println!(
        "\n{}",
        style(format!("Live matches: {}", report.entry_url))
            .bold()
            .cyan()
    );
    println!(
        "  {} records from {} links in {:.1}s",
        style(report.records.len()).yellow(),
        report.links_discovered,
        report.elapsed().num_milliseconds() as f64 / 1000.0
    );
    if !report.failures.is_empty() {
        println!(
            "  {}",
            style(format!("{} pages failed to load", report.failures.len())).red()
        );
    }
    println!();

    if report.records.is_empty() {
        println!("  {}", style("No live matches found.").dim());
        return;
    }

    for line in table_lines(&report.records) {
        println!("{}", line);
    }
}

/// Rows padded to the widest cell of each column, header first
fn table_lines(records: &[MatchRecord]) -> Vec<String> {
    let mut widths = COLUMNS.map(|c| c.chars().count());
    for record in records {
        for (width, value) in widths.iter_mut().zip(record.values()) {
            *width = (*width).max(value.chars().count());
        }
    }

    let render = |cells: [&str; 7]| {
        cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![style(render(COLUMNS)).bold().to_string()];
    lines.extend(records.iter().map(|r| render(r.values())));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use scorewatch_core::record::RecordFields;

    fn record(home: &str, away: &str) -> MatchRecord {
        MatchRecord::new(
            RecordFields {
                home_team: Some(home.to_string()),
                away_team: Some(away.to_string()),
                ..RecordFields::default()
            },
            "https://example.test/match/1",
        )
        .unwrap()
    }

    #[test]
    fn test_table_columns_line_up() {
        console::set_colors_enabled(false);
        let lines = table_lines(&[record("Internazionale", "Milan"), record("Roma", "Lazio")]);

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Match Time"));
        let away_col = lines[0].find("Away Team").unwrap();
        assert_eq!(lines[1].find("Milan"), Some(away_col));
        assert_eq!(lines[2].find("Lazio"), Some(away_col));
    }

    #[test]
    fn test_invalid_url_is_rejected_before_launch() {
        let args = ScrapeArgs {
            url: Some("not a url".to_string()),
            origin: None,
            output: None,
            format: OutputFormat::Json,
            no_live: false,
            concurrency: 1,
            chrome_path: None,
            headed: false,
        };

        let err = execute(args).unwrap_err();
        assert!(err.to_string().contains("Invalid URL"));
    }
}
