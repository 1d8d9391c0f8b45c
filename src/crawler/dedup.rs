//! Content-fingerprint deduplication
//!
//! The seen set lives for one crawl run and only ever grows. Insertion goes
//! through a mutex so that two concurrent workers holding equal content can
//! never both pass the check.

use crate::article::{ArticleRecord, Fingerprint};
use std::collections::HashSet;
use std::sync::Mutex;

/// Set of fingerprints already accepted in this run
#[derive(Debug, Default)]
pub struct DedupIndex {
    seen: Mutex<HashSet<Fingerprint>>,
}

impl DedupIndex {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<Fingerprint>> {
        // A panic elsewhere cannot leave the set half-updated
        self.seen.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Returns true if a record with equal content was already marked seen
    pub fn is_duplicate(&self, record: &ArticleRecord) -> bool {
        self.lock().contains(record.fingerprint())
    }

    pub fn mark_seen(&self, record: &ArticleRecord) {
        self.lock().insert(record.fingerprint().clone());
    }

    /// Checks and marks in one critical section
    ///
    /// # Returns
    ///
    /// `true` if the record is new (and is now marked), `false` if it is a
    /// duplicate.
    pub fn check_and_mark(&self, record: &ArticleRecord) -> bool {
        self.lock().insert(record.fingerprint().clone())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
