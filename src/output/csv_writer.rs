//! CSV export
//!
//! Header `url,text,images`; image URLs are joined with a single space.
//! Fields holding commas, quotes or newlines are quoted by the writer.

use crate::article::ArticleRecord;
use crate::config::ExportFormat;
use crate::output::traits::{OutputResult, ReportWriter, WrittenArtifact, PLACEHOLDER};
use std::path::Path;

/// Column names, in order
pub const CSV_HEADER: [&str; 3] = ["url", "text", "images"];

#[derive(Debug, Clone, Copy, Default)]
pub struct CsvWriter;

impl ReportWriter for CsvWriter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Csv
    }

    fn write(&self, records: &[ArticleRecord], path: &Path) -> OutputResult<WrittenArtifact> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(CSV_HEADER)?;

        let mut degraded = 0;
        for record in records {
            let images = record.images.join(" ");
            let row = [record.url.as_str(), record.text.as_str(), images.as_str()];

            if let Err(e) = writer.write_record(row) {
                tracing::warn!("CSV row for {} failed ({}), writing placeholder", record.url, e);
                degraded += 1;
                writer.write_record([record.url.as_str(), PLACEHOLDER, ""])?;
            }
        }

        writer.flush()?;

        Ok(WrittenArtifact {
            path: path.to_path_buf(),
            format: ExportFormat::Csv,
            records: records.len(),
            degraded,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_csv_quotes_newlines_and_commas() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("articles.csv");
        let records = vec![
            ArticleRecord::new(
                "https://a.com/1",
                "Line one, with comma\nLine \"two\"",
                vec!["https://a.com/x.png".to_string(), "https://a.com/y.png".to_string()],
            ),
            ArticleRecord::new("https://a.com/2", "", vec![]),
        ];

        let artifact = CsvWriter.write(&records, &path).unwrap();
        assert_eq!(artifact.records, 2);
        assert_eq!(artifact.degraded, 0);

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let header: Vec<&str> = reader.headers().unwrap().iter().collect();
        assert_eq!(header, vec!["url", "text", "images"]);

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][1], "Line one, with comma\nLine \"two\"");
        assert_eq!(&rows[0][2], "https://a.com/x.png https://a.com/y.png");
        assert_eq!(&rows[1][1], "");
    }

    #[test]
    fn test_csv_non_latin_text_is_utf8() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ko.csv");
        let records = vec![ArticleRecord::new("https://a.com/1", "다음 경기", vec![])];

        CsvWriter.write(&records, &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("다음 경기"));
    }
}
