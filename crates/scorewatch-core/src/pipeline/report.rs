use crate::MatchRecord;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A page that could not be loaded during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkFailure {
    pub url: String,
    pub reason: String,
}

/// Outcome of one orchestrated scrape
#[derive(Debug, Clone, Serialize)]
pub struct ScrapeReport {
    pub entry_url: String,
    /// Records in discovery order
    pub records: Vec<MatchRecord>,
    pub failures: Vec<LinkFailure>,
    /// Top-level links found on the listing page
    pub links_discovered: usize,
    pub pages_visited: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ScrapeReport {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<MatchRecord> {
        self.records
    }

    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}
