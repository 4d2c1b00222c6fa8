use contracts::projections::p900_canonical_orders::RawOrderRecord;
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read CSV headers: {0}")]
    Headers(#[from] csv::Error),
}

/// Records read from one export
#[derive(Debug, Clone, Default)]
pub struct CsvLoad {
    pub records: Vec<RawOrderRecord>,
    /// Malformed lines that were skipped
    pub skipped: usize,
}

/// Read an export file from disk
pub fn load_file(path: &Path) -> Result<CsvLoad, SourceError> {
    let text = std::fs::read_to_string(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let load = read_records(&text)?;
    tracing::info!(
        "Loaded {} records from {} ({} skipped)",
        load.records.len(),
        path.display(),
        load.skipped
    );
    Ok(load)
}

/// Parse CSV text into raw records keyed by the header names.
///
/// Values stay strings; empty cells are left out of the record.
pub fn read_records(csv_text: &str) -> Result<CsvLoad, SourceError> {
    // Strip UTF-8 BOM if present
    let text = csv_text.trim_start_matches('\u{FEFF}');

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut load = CsvLoad::default();
    for result in reader.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("Skipping malformed CSV record: {}", e);
                load.skipped += 1;
                continue;
            }
        };

        let raw: RawOrderRecord = headers
            .iter()
            .zip(record.iter())
            .filter(|(name, value)| !name.is_empty() && !value.trim().is_empty())
            .map(|(name, value)| (name.clone(), Value::String(value.to_string())))
            .collect();
        load.records.push(raw);
    }
    Ok(load)
}
