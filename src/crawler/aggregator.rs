//! Result aggregation
//!
//! The aggregator owns everything a run produces: the seen set, the kept
//! records with their snapshots, warnings and counters. Outcomes are fed in
//! discovery order after the worker pool's join barrier, so the first page
//! with a given content wins.

use crate::article::{ArticleRecord, CrawlResult, CrawlWarning, PageSnapshot};
use crate::crawler::dedup::DedupIndex;
use crate::crawler::walker::Discovery;
use crate::output::stats::CrawlStatistics;

/// What one article job produced
#[derive(Debug, Clone)]
pub enum PageOutcome {
    Extracted {
        record: ArticleRecord,
        snapshot: PageSnapshot,
    },
    Failed {
        url: String,
        message: String,
    },
}

/// Collects outcomes into the final `CrawlResult`
#[derive(Debug, Default)]
pub struct Aggregator {
    dedup: DedupIndex,
    records: Vec<ArticleRecord>,
    snapshots: Vec<PageSnapshot>,
    warnings: Vec<CrawlWarning>,
    stats: CrawlStatistics,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the counters and warnings of one seed's discovery pass
    pub fn record_discovery(&mut self, discovery: &Discovery) {
        self.stats.seeds += 1;
        self.stats.listing_pages_fetched += discovery.pages_fetched;
        self.warnings.extend(discovery.warnings.iter().cloned());
    }

    pub fn set_links_discovered(&mut self, count: usize) {
        self.stats.links_discovered = count as u64;
    }

    pub fn warn(&mut self, url: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(CrawlWarning {
            url: url.into(),
            message: message.into(),
        });
    }

    /// Adds one outcome
    ///
    /// # Returns
    ///
    /// `true` if a new record was kept
    pub fn accept(&mut self, outcome: PageOutcome) -> bool {
        match outcome {
            PageOutcome::Failed { url, message } => {
                self.stats.pages_failed += 1;
                self.warn(url, message);
                false
            }
            PageOutcome::Extracted { record, snapshot } => {
                self.stats.pages_fetched += 1;
                if !self.dedup.check_and_mark(&record) {
                    tracing::debug!("Skipping duplicate content at {}", record.url);
                    self.stats.duplicates_skipped += 1;
                    return false;
                }
                self.records.push(record);
                self.snapshots.push(snapshot);
                true
            }
        }
    }

    /// Hands the aggregate over as an immutable result
    pub fn finish(mut self) -> CrawlResult {
        self.stats.records_kept = self.records.len() as u64;
        CrawlResult::new(self.records, self.snapshots, self.warnings, self.stats)
    }
}
