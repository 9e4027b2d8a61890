use super::{ControlQuery, LinkFailure, PageSource, RenderedPage, ScrapeReport};
use crate::{Extractor, MatchRecord, Result, SiteLayout};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::collections::HashSet;

/// Knobs for a single scrape run
#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    /// Click the live filter on the listing page before discovering links
    pub activate_live: bool,
    /// Upper bound on detail pages loaded at the same time
    pub max_concurrency: usize,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            activate_live: true,
            max_concurrency: 1,
        }
    }
}

/// Progress callbacks for long runs
pub trait ScrapeObserver: Send + Sync {
    fn links_discovered(&self, _count: usize) {}
    fn link_finished(&self, _url: &str) {}
}

pub struct NoopObserver;

impl ScrapeObserver for NoopObserver {}

/// One page visit inside a link group
struct Visit {
    url: String,
    outcome: std::result::Result<Option<MatchRecord>, String>,
}

/// Drives a [`PageSource`] across listing, detail and sub-event pages
pub struct Orchestrator {
    layout: SiteLayout,
    extractor: Extractor,
    options: ScrapeOptions,
}

impl Orchestrator {
    pub fn new(layout: SiteLayout, options: ScrapeOptions) -> Result<Self> {
        let extractor = Extractor::new(&layout)?;
        Ok(Self {
            layout,
            extractor,
            options,
        })
    }

    pub fn extractor(&self) -> &Extractor {
        &self.extractor
    }

    pub fn layout(&self) -> &SiteLayout {
        &self.layout
    }

    pub async fn run<S>(&self, source: &S, entry_url: &str) -> Result<ScrapeReport>
    where
        S: PageSource + ?Sized,
    {
        self.run_with_observer(source, entry_url, &NoopObserver).await
    }

    /// Scrape everything reachable from `entry_url`.
    ///
    /// Only a failure to load the entry page is returned as an error; every
    /// later failure is recorded in the report and the run carries on.
    pub async fn run_with_observer<S>(
        &self,
        source: &S,
        entry_url: &str,
        observer: &dyn ScrapeObserver,
    ) -> Result<ScrapeReport>
    where
        S: PageSource + ?Sized,
    {
        let started_at = Utc::now();
        tracing::info!("Scraping live matches from {}", entry_url);

        let listing = source
            .navigate(entry_url, Some(&self.layout.listing_landmark))
            .await?;
        let listing = if self.options.activate_live {
            self.activate_live(source, listing).await
        } else {
            listing
        };

        let links = self.extractor.discover_event_links(&listing.html);
        if links.is_empty() {
            tracing::warn!("No live match links found on {}", entry_url);
        } else {
            tracing::info!("Found {} match links", links.len());
        }
        observer.links_discovered(links.len());

        let top_level: HashSet<String> = links.iter().map(String::from).collect();
        let groups = if self.options.max_concurrency <= 1 {
            self.visit_serial(source, &links.iter().collect::<Vec<_>>(), top_level, observer)
                .await
        } else {
            self.visit_buffered(source, &links.iter().collect::<Vec<_>>(), &top_level, observer)
                .await
        };

        let mut report = ScrapeReport {
            entry_url: entry_url.to_string(),
            records: Vec::new(),
            failures: Vec::new(),
            links_discovered: links.len(),
            pages_visited: 0,
            started_at,
            finished_at: started_at,
        };

        let mut emitted = HashSet::new();
        for visit in groups.into_iter().flatten() {
            if !emitted.insert(visit.url.clone()) {
                continue;
            }
            report.pages_visited += 1;
            match visit.outcome {
                Ok(Some(record)) => report.records.push(record),
                Ok(None) => {}
                Err(reason) => report.failures.push(LinkFailure {
                    url: visit.url,
                    reason,
                }),
            }
        }

        report.finished_at = Utc::now();
        tracing::info!(
            "Scrape finished: {} records from {} pages ({} failed)",
            report.records.len(),
            report.pages_visited,
            report.failures.len()
        );

        Ok(report)
    }

    async fn activate_live<S>(&self, source: &S, listing: RenderedPage) -> RenderedPage
    where
        S: PageSource + ?Sized,
    {
        let control = ControlQuery::new(&self.layout.live_control, &self.layout.live_label);
        if !source.activate(&control).await {
            tracing::warn!(
                "Could not click the '{}' filter, using the page as rendered",
                control.label
            );
            return listing;
        }

        match source.snapshot(Some(&self.layout.listing_landmark)).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!("Failed to re-read listing after filter click: {}", e);
                listing
            }
        }
    }

    /// One group at a time; pages seen in earlier groups are not loaded again
    async fn visit_serial<S>(
        &self,
        source: &S,
        links: &[&str],
        mut seen: HashSet<String>,
        observer: &dyn ScrapeObserver,
    ) -> Vec<Vec<Visit>>
    where
        S: PageSource + ?Sized,
    {
        let mut groups = Vec::with_capacity(links.len());
        for link in links {
            let visits = self.visit_group(source, link, &seen).await;
            seen.extend(visits.iter().map(|v| v.url.clone()));
            observer.link_finished(link);
            groups.push(visits);
        }
        groups
    }

    /// Up to `max_concurrency` groups in flight, yielded in discovery order
    async fn visit_buffered<S>(
        &self,
        source: &S,
        links: &[&str],
        top_level: &HashSet<String>,
        observer: &dyn ScrapeObserver,
    ) -> Vec<Vec<Visit>>
    where
        S: PageSource + ?Sized,
    {
        // Collected first: a mapping closure here makes the run future !Send
        let mut tasks = Vec::with_capacity(links.len());
        for &link in links {
            tasks.push(async move {
                let visits = self.visit_group(source, link, top_level).await;
                observer.link_finished(link);
                visits
            });
        }

        stream::iter(tasks)
            .buffered(self.options.max_concurrency)
            .collect()
            .await
    }

    /// Detail page of `link` followed by its sub-event pages
    async fn visit_group<S>(&self, source: &S, link: &str, skip: &HashSet<String>) -> Vec<Visit>
    where
        S: PageSource + ?Sized,
    {
        let mut visits = Vec::new();

        let page = match source.fetch(link, Some(&self.layout.detail_landmark)).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!("Failed to process {}: {}", link, e);
                visits.push(Visit {
                    url: link.to_string(),
                    outcome: Err(e.to_string()),
                });
                return visits;
            }
        };

        visits.push(Visit {
            url: link.to_string(),
            outcome: Ok(self.extractor.extract_record(&page.html, link)),
        });

        for sub_link in self.extractor.discover_sub_links(&page.html).iter() {
            if sub_link == link || skip.contains(sub_link) {
                tracing::debug!("Already visited {}, skipping", sub_link);
                continue;
            }

            let outcome = match source.fetch(sub_link, Some(&self.layout.detail_landmark)).await {
                Ok(sub_page) => Ok(self.extractor.extract_record(&sub_page.html, sub_link)),
                Err(e) => {
                    tracing::warn!("Failed to process sub-link {}: {}", sub_link, e);
                    Err(e.to_string())
                }
            };
            visits.push(Visit {
                url: sub_link.to_string(),
                outcome,
            });
        }

        visits
    }
}
