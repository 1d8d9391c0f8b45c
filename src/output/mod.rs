//! Output module for exporting crawl results
//!
//! This module handles:
//! - Aggregate exports (CSV, JSON, PDF, XLSX) behind the `ReportWriter` trait
//! - Code-page fallback for the fixed-font PDF writer
//! - Per-article PDFs and per-page directories with snapshots and images
//! - Crawl statistics

pub mod csv_writer;
pub mod encoding;
pub mod json;
pub mod layout;
pub mod pdf;
pub mod stats;
mod traits;
pub mod xlsx;

pub use csv_writer::CsvWriter;
pub use json::{read_json, JsonWriter};
pub use pdf::PdfWriter;
pub use stats::{print_statistics, CrawlStatistics};
pub use traits::{ExportReport, OutputError, OutputResult, ReportWriter, WrittenArtifact, PLACEHOLDER};
pub use xlsx::XlsxWriter;

use crate::article::{ArticleRecord, CrawlResult};
use crate::config::{Config, ExportFormat, FetchStrategy};
use std::path::Path;
use std::time::Duration;

/// Returns the writer for an export format
pub fn writer_for(format: ExportFormat) -> Box<dyn ReportWriter> {
    match format {
        ExportFormat::Csv => Box::new(CsvWriter),
        ExportFormat::Json => Box::new(JsonWriter),
        ExportFormat::Pdf => Box::new(PdfWriter),
        ExportFormat::Xlsx => Box::new(XlsxWriter),
    }
}

/// Writes records in one format to `<directory>/<basename>.<ext>`
///
/// # Arguments
///
/// * `records` - Records in result order
/// * `format` - Target format
/// * `directory` - Existing output directory
/// * `basename` - File stem
///
/// # Returns
///
/// * `Ok(WrittenArtifact)` - Path and counts of the written file
/// * `Err(OutputError)` - The file could not be written at all
pub fn write_report(
    records: &[ArticleRecord],
    format: ExportFormat,
    directory: &Path,
    basename: &str,
) -> OutputResult<WrittenArtifact> {
    let path = directory.join(format!("{}.{}", basename, format.extension()));
    let artifact = writer_for(format).write(records, &path)?;

    tracing::info!(
        "Wrote {} records to {}{}",
        artifact.records,
        artifact.path.display(),
        if artifact.degraded > 0 {
            format!(" ({} degraded)", artifact.degraded)
        } else {
            String::new()
        }
    );
    Ok(artifact)
}

/// Writes every artifact the output configuration asks for
///
/// Each format and each per-page file is isolated: failures are collected
/// as warnings in the report. Only failing to create the output directory
/// is an error.
pub async fn export_all(result: &CrawlResult, config: &Config) -> OutputResult<ExportReport> {
    let output = &config.output;
    let root = Path::new(&output.directory);
    std::fs::create_dir_all(root)?;

    let mut report = ExportReport::default();

    for format in &output.formats {
        match write_report(result.records(), *format, root, &output.basename) {
            Ok(artifact) => report.artifacts.push(artifact),
            Err(e) => {
                tracing::warn!("{} export failed: {}", format.extension(), e);
                report
                    .warnings
                    .push(format!("{} export failed: {}", format.extension(), e));
            }
        }
    }

    if output.pdf_per_article {
        layout::write_article_pdfs(result.records(), root, &mut report);
    }

    if output.page_directories {
        let downloader = if output.download_images {
            let client = crate::crawler::build_http_client(&config.user_agent, FetchStrategy::Plain)
                .map_err(|e| OutputError::Write(format!("cannot build download client: {}", e)))?;
            Some(layout::ImageDownloader::new(
                client,
                Duration::from_secs(config.crawler.timeout_secs),
            ))
        } else {
            None
        };
        layout::write_page_directories(result, root, downloader.as_ref(), &mut report).await;
    }

    Ok(report)
}
