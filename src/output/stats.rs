//! Crawl statistics
//!
//! Counters collected while a run progresses and a formatted printout for
//! the end of the run.

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStatistics {
    /// Seed URLs processed
    pub seeds: u64,

    /// Listing pages or sitemap documents fetched during discovery
    pub listing_pages_fetched: u64,

    /// Distinct article links discovered
    pub links_discovered: u64,

    /// Article pages fetched successfully
    pub pages_fetched: u64,

    /// Article pages that failed after all attempts
    pub pages_failed: u64,

    /// Pages dropped because their content was already seen
    pub duplicates_skipped: u64,

    /// Records in the final result
    pub records_kept: u64,
}

impl CrawlStatistics {
    /// Article fetch attempts, successful or not
    pub fn pages_attempted(&self) -> u64 {
        self.pages_fetched + self.pages_failed
    }

    /// Returns the fetch success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        let attempted = self.pages_attempted();
        if attempted == 0 {
            return 0.0;
        }
        (self.pages_fetched as f64 / attempted as f64) * 100.0
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Discovery:");
    println!("  Seeds: {}", stats.seeds);
    println!("  Listing pages fetched: {}", stats.listing_pages_fetched);
    println!("  Links discovered: {}", stats.links_discovered);
    println!();

    println!("Articles:");
    println!("  Fetched: {}", stats.pages_fetched);
    println!("  Failed: {}", stats.pages_failed);
    println!("  Duplicates skipped: {}", stats.duplicates_skipped);
    println!("  Records kept: {}", stats.records_kept);
    println!();

    println!(
        "Success Rate: {:.1}% ({} / {} article fetches succeeded)",
        stats.success_rate(),
        stats.pages_fetched,
        stats.pages_attempted()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_rate() {
        let stats = CrawlStatistics {
            pages_fetched: 80,
            pages_failed: 20,
            ..CrawlStatistics::default()
        };
        assert_eq!(stats.pages_attempted(), 100);
        assert!((stats.success_rate() - 80.0).abs() < 0.01);
    }

    #[test]
    fn test_success_rate_zero_pages() {
        assert_eq!(CrawlStatistics::default().success_rate(), 0.0);
    }
}
