pub mod error;
pub mod export;
pub mod extract;
pub mod pipeline;
pub mod record;

pub use error::{Error, Result};
pub use extract::{Extractor, SiteLayout};
pub use pipeline::{Orchestrator, PageSource, RenderedPage, ScrapeReport};
pub use record::{LinkSet, MatchRecord, NOT_AVAILABLE};
