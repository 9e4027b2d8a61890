use super::{AWAY_SCORE_INDEX, Extractor, HOME_SCORE_INDEX, MIN_SCORE_PARTS, stripped_text};
use crate::record::{MatchRecord, RecordFields};
use scraper::{ElementRef, Html, Selector};

impl Extractor {
    /// Extract a match record from a rendered detail or sub-event page.
    ///
    /// Returns `None` when the page names neither team.
    pub fn extract_record(&self, page_html: &str, source_url: &str) -> Option<MatchRecord> {
        let document = Html::parse_document(page_html);
        let root = document.root_element();

        let (home_score, away_score) = self.scores(root);
        let fields = RecordFields {
            match_time: first_text(root, &self.start_time),
            home_team: self.team_name(root, &self.home_block),
            away_team: self.team_name(root, &self.away_block),
            home_score,
            away_score,
            status: first_text(root, &self.status),
        };

        let record = MatchRecord::new(fields, source_url);
        if record.is_none() {
            tracing::debug!("No teams found on {}, discarding", source_url);
        }
        record
    }

    fn team_name(&self, root: ElementRef<'_>, block: &Selector) -> Option<String> {
        let block = root.select(block).next()?;
        first_text(block, &self.participant_name)
    }

    fn scores(&self, root: ElementRef<'_>) -> (Option<String>, Option<String>) {
        let Some(block) = root.select(&self.score_block).next() else {
            return (None, None);
        };

        let parts: Vec<ElementRef<'_>> = block.select(&self.score_part).collect();
        if parts.len() < MIN_SCORE_PARTS {
            tracing::debug!("Score block has {} parts, expected {}", parts.len(), MIN_SCORE_PARTS);
            return (None, None);
        }

        (
            stripped_text(parts[HOME_SCORE_INDEX]),
            stripped_text(parts[AWAY_SCORE_INDEX]),
        )
    }
}

fn first_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope.select(selector).next().and_then(stripped_text)
}
