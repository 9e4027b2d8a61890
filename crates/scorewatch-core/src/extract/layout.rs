use url::Url;

/// Default site the scraper targets
pub const DEFAULT_ORIGIN: &str = "https://www.diretta.it";

/// Position of the home score among the score block's spans
pub const HOME_SCORE_INDEX: usize = 0;
/// Position of the away score; the span between the two is the separator
pub const AWAY_SCORE_INDEX: usize = 2;
/// A score block with fewer spans than this is treated as having no score
pub const MIN_SCORE_PARTS: usize = 3;

/// CSS selectors describing where match data lives on the scraped site.
///
/// The defaults follow the current markup of [`DEFAULT_ORIGIN`]. All
/// selectors are compiled once by [`Extractor::new`](super::Extractor::new).
#[derive(Debug, Clone)]
pub struct SiteLayout {
    /// Base used to resolve relative hrefs
    pub origin: Url,

    /// Event title elements on the listing page
    pub event_title: String,
    /// Anchor inside an event title that leads to the detail page
    pub event_link: String,

    /// Section of a detail page that links to sub-event pages
    pub summary_section: String,
    /// Links collected inside the summary section
    pub summary_link: String,

    pub start_time: String,
    pub home_block: String,
    pub away_block: String,
    /// Team name anchor, looked up inside the home and away blocks
    pub participant_name: String,
    pub score_block: String,
    /// Parts of the score block, looked up inside it
    pub score_part: String,
    pub status: String,

    /// Filter tab that narrows the listing to live events
    pub live_control: String,
    /// Text the live filter tab must contain
    pub live_label: String,

    /// Element whose presence means the listing has rendered
    pub listing_landmark: String,
    /// Element whose presence means a detail page has rendered
    pub detail_landmark: String,
}

impl SiteLayout {
    /// Default layout pointed at a different origin
    pub fn with_origin(origin: Url) -> Self {
        Self {
            origin,
            ..Self::default()
        }
    }

    /// Origin rendered without a trailing slash, as it appears in raw hrefs
    pub fn origin_prefix(&self) -> &str {
        self.origin.as_str().trim_end_matches('/')
    }
}

impl Default for SiteLayout {
    fn default() -> Self {
        Self {
            origin: Url::parse(DEFAULT_ORIGIN).expect("default origin is a valid URL"),
            event_title: "div.event__title".to_string(),
            event_link: "a.wcl-linkBase_CdaEq".to_string(),
            summary_section: "section.event.event--summary".to_string(),
            summary_link: "a[href]".to_string(),
            start_time: "div.duelParticipant__startTime".to_string(),
            home_block: "div.duelParticipant__home".to_string(),
            away_block: "div.duelParticipant__away".to_string(),
            participant_name: "a.participant__participantName".to_string(),
            score_block: "div.detailScore__wrapper".to_string(),
            score_part: "span".to_string(),
            status: "span.fixedHeaderDuel__detailStatus".to_string(),
            live_control: "div[class*='filters__tab'] div".to_string(),
            live_label: "LIVE".to_string(),
            listing_landmark: "div.event__title".to_string(),
            detail_landmark: "div.duelParticipant".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_prefix_has_no_trailing_slash() {
        let layout = SiteLayout::default();
        assert_eq!(layout.origin_prefix(), "https://www.diretta.it");
    }

    #[test]
    fn test_with_origin_keeps_selectors() {
        let layout = SiteLayout::with_origin(Url::parse("http://localhost:8080").unwrap());
        assert_eq!(layout.origin_prefix(), "http://localhost:8080");
        assert_eq!(layout.event_title, "div.event__title");
    }
}
