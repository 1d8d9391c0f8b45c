//! Report writer trait and output types
//!
//! This module defines the interface every export format implements and
//! the summary returned once artifacts are on disk.

use crate::article::ArticleRecord;
use crate::config::ExportFormat;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("Failed to format output: {0}")]
    Format(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("XLSX error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Text written in place of a value that the target format cannot hold
pub const PLACEHOLDER: &str = "[content could not be encoded]";

/// What one writer produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenArtifact {
    pub path: PathBuf,

    pub format: ExportFormat,

    /// Records written
    pub records: usize,

    /// Records whose content was substituted or replaced by a placeholder
    pub degraded: usize,
}

/// Trait for report writers
///
/// A writer serializes the whole record set into a single file. It must
/// isolate per-record problems: a value the format cannot represent is
/// substituted and counted in `degraded`, never allowed to abort the file.
pub trait ReportWriter {
    /// Format produced by this writer
    fn format(&self) -> ExportFormat;

    /// Writes every record to `path`
    ///
    /// # Arguments
    ///
    /// * `records` - Records in result order
    /// * `path` - Destination file (overwritten)
    fn write(&self, records: &[ArticleRecord], path: &Path) -> OutputResult<WrittenArtifact>;
}

/// Everything produced by one export pass
#[derive(Debug, Clone, Default)]
pub struct ExportReport {
    /// Artifacts written successfully
    pub artifacts: Vec<WrittenArtifact>,

    /// Extra files (per-article PDFs, page directories, images)
    pub files: Vec<PathBuf>,

    /// Non-fatal problems, one line each
    pub warnings: Vec<String>,
}

impl ExportReport {
    /// Every path written, aggregate artifacts first
    pub fn paths(&self) -> Vec<PathBuf> {
        self.artifacts
            .iter()
            .map(|artifact| artifact.path.clone())
            .chain(self.files.iter().cloned())
            .collect()
    }

    pub fn degraded_records(&self) -> usize {
        self.artifacts.iter().map(|artifact| artifact.degraded).sum()
    }
}
