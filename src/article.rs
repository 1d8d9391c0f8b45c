//! Article records and the crawl result
//!
//! An `ArticleRecord` is created once per fetched, non-duplicate article.
//! Its fingerprint is derived from the text and image list only, so two
//! records with equal content are duplicates regardless of URL.

use crate::output::stats::CrawlStatistics;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Content fingerprint: hex-encoded SHA-256
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Computes the fingerprint of (text, images)
    ///
    /// Text is normalized by collapsing whitespace runs to one space and
    /// trimming. Each part is followed by a NUL byte so that moving
    /// characters between text and image URLs changes the hash. Empty text
    /// with no images hashes like any other content.
    pub fn compute(text: &str, images: &[String]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(normalize_text(text).as_bytes());
        hasher.update([0u8]);
        for image in images {
            hasher.update(image.as_bytes());
            hasher.update([0u8]);
        }
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Flat export row: the stable column set `url, text, images`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleRow {
    pub url: String,
    pub text: String,
    #[serde(default)]
    pub images: Vec<String>,
}

/// One extracted article
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ArticleRow")]
pub struct ArticleRecord {
    pub url: String,
    pub text: String,
    pub images: Vec<String>,
    #[serde(skip_serializing)]
    fingerprint: Fingerprint,
}

impl ArticleRecord {
    pub fn new(url: impl Into<String>, text: impl Into<String>, images: Vec<String>) -> Self {
        let text = text.into();
        let fingerprint = Fingerprint::compute(&text, &images);
        Self {
            url: url.into(),
            text,
            images,
            fingerprint,
        }
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    /// Last non-empty path segment, used to name per-article files
    pub fn slug(&self) -> Option<String> {
        let url = url::Url::parse(&self.url).ok()?;
        url.path_segments()?
            .filter(|segment| !segment.is_empty())
            .last()
            .map(str::to_string)
    }
}

impl From<ArticleRow> for ArticleRecord {
    fn from(row: ArticleRow) -> Self {
        Self::new(row.url, row.text, row.images)
    }
}

/// Optional raw artifacts captured alongside a record
#[derive(Debug, Clone, Default)]
pub struct PageSnapshot {
    /// Raw HTML as fetched
    pub html: Option<String>,

    /// PNG screenshot from the rendered strategy
    pub screenshot: Option<Vec<u8>>,
}

/// Per-URL problem surfaced to the caller; never fatal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlWarning {
    pub url: String,
    pub message: String,
}

impl fmt::Display for CrawlWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.url, self.message)
    }
}

/// Final deliverable of one crawl run
#[derive(Debug, Clone, Default)]
pub struct CrawlResult {
    records: Vec<ArticleRecord>,
    snapshots: Vec<PageSnapshot>,
    warnings: Vec<CrawlWarning>,
    stats: CrawlStatistics,
}

impl CrawlResult {
    pub(crate) fn new(
        records: Vec<ArticleRecord>,
        snapshots: Vec<PageSnapshot>,
        warnings: Vec<CrawlWarning>,
        stats: CrawlStatistics,
    ) -> Self {
        debug_assert_eq!(records.len(), snapshots.len());
        Self {
            records,
            snapshots,
            warnings,
            stats,
        }
    }

    /// Builds a result from records alone (no snapshots, warnings or stats)
    pub fn from_records(records: Vec<ArticleRecord>) -> Self {
        let snapshots = vec![PageSnapshot::default(); records.len()];
        let stats = CrawlStatistics {
            records_kept: records.len() as u64,
            ..CrawlStatistics::default()
        };
        Self {
            records,
            snapshots,
            warnings: Vec::new(),
            stats,
        }
    }

    pub fn records(&self) -> &[ArticleRecord] {
        &self.records
    }

    /// Snapshot for the record at the same index
    pub fn snapshot(&self, index: usize) -> Option<&PageSnapshot> {
        self.snapshots.get(index)
    }

    pub fn warnings(&self) -> &[CrawlWarning] {
        &self.warnings
    }

    pub fn stats(&self) -> &CrawlStatistics {
        &self.stats
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<ArticleRecord> {
        self.records
    }
}
