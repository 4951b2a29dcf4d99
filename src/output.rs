//! Delimited-text output of scraped records.

use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::info;

use crate::error::ScrapeError;
use crate::models::{ListingRecord, HEADER};

/// Delimiter flavor of the output file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Comma-separated values.
    #[default]
    Csv,
    /// Tab-separated values.
    Tsv,
}

impl OutputFormat {
    pub fn delimiter(self) -> u8 {
        match self {
            OutputFormat::Csv => b',',
            OutputFormat::Tsv => b'\t',
        }
    }
}

/// Write the header row and one row per record to `writer`.
pub fn write_records<W: io::Write>(
    writer: W,
    records: &[ListingRecord],
    format: OutputFormat,
) -> Result<(), ScrapeError> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(format.delimiter())
        .from_writer(writer);

    wtr.write_record(HEADER)?;
    for record in records {
        wtr.write_record(record.to_row())?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write records to `path`, replacing any existing file.
///
/// Rows go to a temporary file next to `path` which is renamed into place
/// only once everything has been written, so a failure never leaves a
/// truncated file behind.
pub fn write_records_to_path(
    path: &Path,
    records: &[ListingRecord],
    format: OutputFormat,
) -> Result<(), ScrapeError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    write_records(tmp.as_file_mut(), records, format)?;
    tmp.persist(path).map_err(|e| e.error)?;

    info!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record(description: &str, price: &str) -> ListingRecord {
        ListingRecord {
            description: description.to_string(),
            price: price.to_string(),
            rating: "4.6 out of 5 stars".to_string(),
            review_count: "2,315".to_string(),
            product_url: "https://www.amazon.in/dp/B0BDK62PDX".to_string(),
        }
    }

    #[test]
    fn test_csv_quotes_fields_with_commas() {
        let mut buf = Vec::new();
        write_records(&mut buf, &[record("Apple iPhone 14 (128 GB)", "₹69,900")], OutputFormat::Csv)
            .unwrap();

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Description,Price,Rating,ReviewCount,Url");
        assert_eq!(
            lines[1],
            "Apple iPhone 14 (128 GB),\"₹69,900\",4.6 out of 5 stars,\"2,315\",https://www.amazon.in/dp/B0BDK62PDX"
        );
    }

    #[test]
    fn test_csv_escapes_quotes() {
        let mut buf = Vec::new();
        write_records(&mut buf, &[record("6.1\" display", "")], OutputFormat::Csv).unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert!(text.lines().nth(1).unwrap().starts_with("\"6.1\"\" display\","));
    }

    #[test]
    fn test_tsv_uses_tabs() {
        let mut buf = Vec::new();
        write_records(&mut buf, &[record("Case", "₹499")], OutputFormat::Tsv).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Description\tPrice\tRating\tReviewCount\tUrl");
        assert_eq!(lines[1].split('\t').count(), 5);
        // comma needs no quoting with a tab delimiter
        assert!(lines[1].contains("\t2,315\t"));
    }

    #[test]
    fn test_write_to_path_replaces_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("result.csv");
        std::fs::write(&path, "stale").unwrap();

        write_records_to_path(&path, &[record("A", "1"), record("B", "")], OutputFormat::Csv)
            .unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(!text.contains("stale"));
    }

    #[test]
    fn test_empty_result_writes_header_only() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.csv");

        write_records_to_path(&path, &[], OutputFormat::Csv).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.trim_end(), "Description,Price,Rating,ReviewCount,Url");
    }
}
