//! JSON export
//!
//! A pretty-printed array of `{url, text, images}` objects. The same shape
//! is used for the per-page `data.json` files.

use crate::article::ArticleRecord;
use crate::config::ExportFormat;
use crate::output::traits::{OutputResult, ReportWriter, WrittenArtifact};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonWriter;

impl ReportWriter for JsonWriter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Json
    }

    fn write(&self, records: &[ArticleRecord], path: &Path) -> OutputResult<WrittenArtifact> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, records)?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        Ok(WrittenArtifact {
            path: path.to_path_buf(),
            format: ExportFormat::Json,
            records: records.len(),
            degraded: 0,
        })
    }
}

/// Writes a single record as a pretty-printed object
pub fn write_record(record: &ArticleRecord, path: &Path) -> OutputResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, record)?;
    writer.flush()?;
    Ok(())
}

/// Reads records back from a JSON export
///
/// Fingerprints are recomputed from the parsed content.
pub fn read_json(path: &Path) -> OutputResult<Vec<ArticleRecord>> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_json_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("articles.json");
        let records = vec![
            ArticleRecord::new("https://a.com/1", "첫 번째\nsecond", vec!["https://a.com/i.png".to_string()]),
            ArticleRecord::new("https://a.com/2", "", vec![]),
        ];

        JsonWriter.write(&records, &path).unwrap();
        let parsed = read_json(&path).unwrap();

        assert_eq!(parsed, records);
        assert_eq!(parsed[0].fingerprint(), records[0].fingerprint());
    }

    #[test]
    fn test_json_shape() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("one.json");
        write_record(&ArticleRecord::new("https://a.com/1", "Body", vec![]), &path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["url"], "https://a.com/1");
        assert_eq!(value["text"], "Body");
        assert!(value["images"].as_array().unwrap().is_empty());
        assert!(value.get("fingerprint").is_none());
    }
}
