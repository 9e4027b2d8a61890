use crate::MatchRecord;

/// Reply used when a scrape produced no records
pub const NO_MATCHES_MESSAGE: &str = "No live matches found.";

/// One chat message per record
pub fn format_record(record: &MatchRecord) -> String {
    format!(
        "{} - {} vs {}\nScore: {} - {}\nStatus: {}\nLink: {}",
        record.match_time(),
        record.home_team(),
        record.away_team(),
        record.home_score(),
        record.away_score(),
        record.status(),
        record.source_link()
    )
}

/// Compact digest of all records in a single message
pub fn format_summary(records: &[MatchRecord]) -> String {
    if records.is_empty() {
        return NO_MATCHES_MESSAGE.to_string();
    }

    records
        .iter()
        .map(|r| format!("{} vs {}: {}", r.home_team(), r.away_team(), r.status()))
        .collect::<Vec<_>>()
        .join("\n\n")
}
