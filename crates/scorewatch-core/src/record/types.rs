use serde::Serialize;

/// Placeholder for any field the page did not provide
pub const NOT_AVAILABLE: &str = "N/A";

/// Column headers used by every tabular export, in field order
pub const COLUMNS: [&str; 7] = [
    "Match Time",
    "Home Team",
    "Away Team",
    "Home Score",
    "Away Score",
    "Status",
    "Match Link",
];

/// A single snapshot of one match as rendered on a detail or sub-event page.
///
/// Every field except `source_link` is free text copied from the page, or
/// [`NOT_AVAILABLE`] when the page had no such region. A record always names at
/// least one team; see [`MatchRecord::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchRecord {
    #[serde(rename = "Match Time")]
    match_time: String,
    #[serde(rename = "Home Team")]
    home_team: String,
    #[serde(rename = "Away Team")]
    away_team: String,
    #[serde(rename = "Home Score")]
    home_score: String,
    #[serde(rename = "Away Score")]
    away_score: String,
    #[serde(rename = "Status")]
    status: String,
    #[serde(rename = "Match Link")]
    source_link: String,
}

/// Raw field values collected from a page before validation.
///
/// `None` means the region was missing and becomes [`NOT_AVAILABLE`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFields {
    pub match_time: Option<String>,
    pub home_team: Option<String>,
    pub away_team: Option<String>,
    pub home_score: Option<String>,
    pub away_score: Option<String>,
    pub status: Option<String>,
}

impl MatchRecord {
    /// Build a record from extracted fields.
    ///
    /// Returns `None` when neither team is known; such pages are not matches.
    pub fn new(fields: RecordFields, source_link: impl Into<String>) -> Option<Self> {
        let record = Self {
            match_time: or_sentinel(fields.match_time),
            home_team: or_sentinel(fields.home_team),
            away_team: or_sentinel(fields.away_team),
            home_score: or_sentinel(fields.home_score),
            away_score: or_sentinel(fields.away_score),
            status: or_sentinel(fields.status),
            source_link: source_link.into(),
        };

        if record.home_team == NOT_AVAILABLE && record.away_team == NOT_AVAILABLE {
            return None;
        }

        Some(record)
    }

    pub fn match_time(&self) -> &str {
        &self.match_time
    }

    pub fn home_team(&self) -> &str {
        &self.home_team
    }

    pub fn away_team(&self) -> &str {
        &self.away_team
    }

    pub fn home_score(&self) -> &str {
        &self.home_score
    }

    pub fn away_score(&self) -> &str {
        &self.away_score
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn source_link(&self) -> &str {
        &self.source_link
    }

    /// Field values in [`COLUMNS`] order
    pub fn values(&self) -> [&str; 7] {
        [
            &self.match_time,
            &self.home_team,
            &self.away_team,
            &self.home_score,
            &self.away_score,
            &self.status,
            &self.source_link,
        ]
    }
}

fn or_sentinel(value: Option<String>) -> String {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => NOT_AVAILABLE.to_string(),
    }
}
