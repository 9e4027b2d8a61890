use crate::record::COLUMNS;
use crate::{MatchRecord, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// File name used when no output path is given
pub const DEFAULT_CSV_FILE: &str = "live_match_details.csv";

pub struct CsvExporter;

impl CsvExporter {
    /// Write records to a CSV file with a header row
    pub fn to_file(records: &[MatchRecord], path: &Path) -> Result<()> {
        tracing::debug!("Writing CSV export to: {}", path.display());

        let file = File::create(path)?;
        Self::to_writer(records, BufWriter::new(file))?;

        tracing::info!(
            "Wrote {} match records to {}",
            records.len(),
            path.display()
        );

        Ok(())
    }

    /// Render records as CSV bytes, e.g. for an upload
    pub fn to_bytes(records: &[MatchRecord]) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        Self::to_writer(records, &mut buffer)?;
        Ok(buffer)
    }

    pub fn to_writer<W: Write>(records: &[MatchRecord], writer: W) -> Result<()> {
        let mut out = csv::Writer::from_writer(writer);

        out.write_record(COLUMNS)?;
        for record in records {
            out.write_record(record.values())?;
        }
        out.flush()?;

        Ok(())
    }
}
