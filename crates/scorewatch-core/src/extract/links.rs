use super::Extractor;
use crate::LinkSet;
use scraper::Html;

impl Extractor {
    /// Collect detail-page links from a listing page.
    ///
    /// Each event title contributes the href of its inner anchor, resolved
    /// against the origin. Titles without that anchor are skipped.
    pub fn discover_event_links(&self, listing_html: &str) -> LinkSet {
        let document = Html::parse_document(listing_html);
        let mut links = LinkSet::new();

        for title in document.select(&self.event_title) {
            let Some(href) = title
                .select(&self.event_link)
                .find_map(|anchor| anchor.value().attr("href"))
            else {
                tracing::debug!("Event title without link, skipping");
                continue;
            };

            if let Some(url) = self.resolve(href) {
                links.insert(url.to_string());
            }
        }

        tracing::debug!("Discovered {} event links", links.len());
        links
    }

    /// Collect sub-event links from the summary section of a detail page.
    ///
    /// Fragment links that point back at the site root are excluded. A page
    /// without a summary section yields an empty set.
    pub fn discover_sub_links(&self, detail_html: &str) -> LinkSet {
        let document = Html::parse_document(detail_html);
        let mut links = LinkSet::new();

        let Some(section) = document.select(&self.summary_section).next() else {
            tracing::debug!("No event summary section on page");
            return links;
        };

        for anchor in section.select(&self.summary_link) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };

            if self.is_root_fragment(href) {
                tracing::debug!("Skipping root fragment link '{}'", href);
                continue;
            }

            if let Some(url) = self.resolve(href) {
                links.insert(url.to_string());
            }
        }

        tracing::debug!("Discovered {} sub-links", links.len());
        links
    }

    /// True for in-page anchors on the site root, e.g. `<origin>#`
    fn is_root_fragment(&self, href: &str) -> bool {
        if href.contains(&format!("{}#", self.origin_prefix)) {
            return true;
        }

        match self.resolve(href) {
            Some(url) => {
                url.fragment().is_some()
                    && url.origin() == self.origin.origin()
                    && url.path() == "/"
            }
            None => false,
        }
    }
}
