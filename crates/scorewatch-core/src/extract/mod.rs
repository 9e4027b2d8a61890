//! Pure HTML extraction for the scraped site.
//!
//! [`Extractor`] turns rendered page markup into [`MatchRecord`]s and
//! [`LinkSet`]s. Missing page regions never fail extraction: a missing field
//! becomes [`NOT_AVAILABLE`](crate::NOT_AVAILABLE) and a missing link section
//! yields an empty set.

mod layout;
mod links;
mod record;

pub use layout::{
    AWAY_SCORE_INDEX, DEFAULT_ORIGIN, HOME_SCORE_INDEX, MIN_SCORE_PARTS, SiteLayout,
};

use crate::{Error, Result};
use scraper::{ElementRef, Selector};
use url::Url;

/// Compiled selectors for one [`SiteLayout`]
#[derive(Debug, Clone)]
pub struct Extractor {
    origin: Url,
    origin_prefix: String,
    event_title: Selector,
    event_link: Selector,
    summary_section: Selector,
    summary_link: Selector,
    start_time: Selector,
    home_block: Selector,
    away_block: Selector,
    participant_name: Selector,
    score_block: Selector,
    score_part: Selector,
    status: Selector,
}

impl Extractor {
    /// Compile every selector of the layout
    pub fn new(layout: &SiteLayout) -> Result<Self> {
        Ok(Self {
            origin: layout.origin.clone(),
            origin_prefix: layout.origin_prefix().to_string(),
            event_title: compile(&layout.event_title)?,
            event_link: compile(&layout.event_link)?,
            summary_section: compile(&layout.summary_section)?,
            summary_link: compile(&layout.summary_link)?,
            start_time: compile(&layout.start_time)?,
            home_block: compile(&layout.home_block)?,
            away_block: compile(&layout.away_block)?,
            participant_name: compile(&layout.participant_name)?,
            score_block: compile(&layout.score_block)?,
            score_part: compile(&layout.score_part)?,
            status: compile(&layout.status)?,
        })
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// Resolve an href against the origin
    fn resolve(&self, href: &str) -> Option<Url> {
        match self.origin.join(href.trim()) {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::debug!("Skipping unresolvable href '{}': {}", href, e);
                None
            }
        }
    }
}

fn compile(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| Error::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// Text of an element with each text node trimmed and concatenated.
///
/// Returns `None` when nothing but whitespace remains.
fn stripped_text(element: ElementRef<'_>) -> Option<String> {
    let text = element
        .text()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<String>();

    if text.is_empty() { None } else { Some(text) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn test_invalid_selector_is_reported() {
        let layout = SiteLayout {
            event_title: "div[".to_string(),
            ..SiteLayout::default()
        };

        let err = Extractor::new(&layout).unwrap_err();
        assert!(err.to_string().contains("div["));
    }

    #[test]
    fn test_stripped_text_drops_whitespace_nodes() {
        let html = Html::parse_fragment("<div>  <b> 2 </b>\n <i>-</i>  <b>1</b> </div>");
        let div = html.select(&Selector::parse("div").unwrap()).next().unwrap();

        assert_eq!(stripped_text(div).as_deref(), Some("2-1"));
    }

    #[test]
    fn test_stripped_text_concatenates_nested_nodes() {
        let html = Html::parse_fragment("<div>2nd Half <span> 67'</span></div>");
        let div = html.select(&Selector::parse("div").unwrap()).next().unwrap();

        assert_eq!(stripped_text(div).as_deref(), Some("2nd Half67'"));
    }

    #[test]
    fn test_stripped_text_empty_is_none() {
        let html = Html::parse_fragment("<div>   \n  </div>");
        let div = html.select(&Selector::parse("div").unwrap()).next().unwrap();

        assert!(stripped_text(div).is_none());
    }
}
