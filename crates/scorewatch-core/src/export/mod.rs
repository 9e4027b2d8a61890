mod writer;
mod message;

pub use writer::{CsvExporter, DEFAULT_CSV_FILE};
pub use message::{NO_MATCHES_MESSAGE, format_record, format_summary};
