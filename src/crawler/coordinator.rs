//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the run that ties every component together:
//! - Building the fetcher for the configured strategy (once per run)
//! - Discovering article links for every seed
//! - Fetching and extracting articles on the bounded worker pool
//! - Feeding outcomes, in discovery order, through deduplication
//! - Releasing the fetcher's resources on every exit path

use crate::article::{ArticleRecord, CrawlResult, PageSnapshot};
use crate::config::{Config, FetchStrategy};
use crate::crawler::aggregator::{Aggregator, PageOutcome};
use crate::crawler::extractor::ContentExtractor;
use crate::crawler::fetcher::{FetchRequest, HttpFetcher, PageFetcher, RetryPolicy, RetryingFetcher};
use crate::crawler::scheduler::WorkerPool;
use crate::crawler::walker::Walker;
use crate::url::{parse_http_url, KeywordFilter, LinkSet};
use crate::{ConfigError, ScribeError};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    fetcher: Arc<dyn PageFetcher>,
    filter: KeywordFilter,
    extractor: Arc<ContentExtractor>,
    pool: WorkerPool,
    seeds: Vec<Url>,
}

impl Coordinator {
    /// Creates a coordinator with the fetcher for the configured strategy
    ///
    /// For the rendered strategy this launches the headless browser, which
    /// stays up until `run` returns.
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(ScribeError)` - No seeds, an invalid seed, or a fetcher that
    ///   could not be built
    pub async fn new(config: Config) -> Result<Self, ScribeError> {
        // Seeds are checked before a browser is launched for nothing
        parse_seeds(&config)?;
        let fetcher = build_fetcher(&config).await?;
        Self::with_fetcher(config, fetcher)
    }

    /// Creates a coordinator around an existing fetcher
    ///
    /// The fetcher is wrapped with the configured retry policy.
    pub fn with_fetcher(config: Config, fetcher: Arc<dyn PageFetcher>) -> Result<Self, ScribeError> {
        let seeds = parse_seeds(&config)?;

        let policy = RetryPolicy::new(
            config.crawler.max_attempts,
            Duration::from_millis(config.crawler.retry_delay_ms),
        );
        let fetcher: Arc<dyn PageFetcher> = Arc::new(RetryingFetcher::new(fetcher, policy));

        let configured = config.crawler.max_concurrent_fetches as usize;
        let workers = fetcher
            .max_parallelism()
            .map_or(configured, |limit| limit.min(configured));

        let filter = KeywordFilter::from_config(&config.filter);
        let mut extractor = ContentExtractor::new(&config.extraction);
        if config.filter.filter_images {
            extractor = extractor.with_image_filter(filter.clone());
        }

        Ok(Self {
            config: Arc::new(config),
            fetcher,
            filter,
            extractor: Arc::new(extractor),
            pool: WorkerPool::new(workers),
            seeds,
        })
    }

    pub fn seeds(&self) -> &[Url] {
        &self.seeds
    }

    /// Number of article fetches allowed in flight
    pub fn workers(&self) -> usize {
        self.pool.size()
    }

    /// Runs the crawl and shuts the fetcher down, whatever the outcome
    pub async fn run(&self) -> Result<CrawlResult, ScribeError> {
        let start_time = std::time::Instant::now();
        let outcome = self.crawl().await;
        self.fetcher.shutdown().await;

        if let Ok(result) = &outcome {
            tracing::info!(
                "Crawl completed: {} records ({} warnings) in {:?}",
                result.len(),
                result.warnings().len(),
                start_time.elapsed()
            );
        }
        outcome
    }

    async fn crawl(&self) -> Result<CrawlResult, ScribeError> {
        let mut aggregator = Aggregator::new();
        let walker = Walker::new(self.fetcher.as_ref(), &self.config.crawler, &self.filter);

        let mut links = LinkSet::new();
        // Seeds standing in for a missing sitemap: losing one loses the seed
        let mut fallback_seeds: HashSet<String> = HashSet::new();
        let mut failed_seeds: HashSet<String> = HashSet::new();
        let mut first_failure: Option<ScribeError> = None;
        let distinct_seeds = self
            .seeds
            .iter()
            .map(ToString::to_string)
            .collect::<HashSet<_>>()
            .len();

        for seed in &self.seeds {
            match walker.discover(seed).await {
                Ok(discovery) => {
                    aggregator.record_discovery(&discovery);
                    if discovery.seed_only {
                        fallback_seeds.insert(seed.to_string());
                    }
                    links.extend_from(discovery.links);
                }
                Err(e)
                    if self.seeds.len() > 1 && matches!(e, ScribeError::SeedUnreachable { .. }) =>
                {
                    tracing::warn!("{}", e);
                    aggregator.warn(seed.as_str(), e.to_string());
                    failed_seeds.insert(seed.to_string());
                    first_failure.get_or_insert(e);
                }
                Err(e) => return Err(e),
            }
        }

        if failed_seeds.len() == distinct_seeds {
            if let Some(e) = first_failure {
                return Err(e);
            }
        }

        aggregator.set_links_discovered(links.len());
        tracing::info!(
            "Fetching {} articles with {} workers",
            links.len(),
            self.pool.size()
        );

        let strategy = self.config.crawler.fetch_strategy;
        let timeout = Duration::from_secs(self.config.crawler.timeout_secs);
        let keep_html = self.config.output.page_directories;

        let outcomes = self
            .pool
            .run(links.into_vec(), |link| {
                let fetcher = Arc::clone(&self.fetcher);
                let extractor = Arc::clone(&self.extractor);
                async move {
                    fetch_article(fetcher.as_ref(), &extractor, link, strategy, timeout, keep_html)
                        .await
                }
            })
            .await?;

        for outcome in outcomes {
            if let PageOutcome::Failed { url, message } = &outcome {
                if fallback_seeds.contains(url) {
                    failed_seeds.insert(url.clone());
                    first_failure.get_or_insert(ScribeError::SeedUnreachable {
                        url: url.clone(),
                        reason: message.clone(),
                    });
                }
            }
            aggregator.accept(outcome);
        }

        // Only a run where every seed was lost is fatal
        if failed_seeds.len() == distinct_seeds {
            if let Some(e) = first_failure {
                return Err(e);
            }
        }

        Ok(aggregator.finish())
    }
}

/// Fetches one article page and extracts its record
async fn fetch_article(
    fetcher: &dyn PageFetcher,
    extractor: &ContentExtractor,
    link: String,
    strategy: FetchStrategy,
    timeout: Duration,
    keep_html: bool,
) -> PageOutcome {
    let url = match Url::parse(&link) {
        Ok(url) => url,
        Err(e) => {
            return PageOutcome::Failed {
                url: link,
                message: e.to_string(),
            }
        }
    };

    let result = fetcher.fetch(&FetchRequest::new(url.clone(), strategy, timeout)).await;
    if !result.is_ok() {
        tracing::warn!(
            "Failed to fetch {} after {} attempts: {}",
            link,
            result.attempts,
            result.error_message()
        );
        return PageOutcome::Failed {
            url: link,
            message: result.error_message(),
        };
    }

    let html = result.body.unwrap_or_default();
    let content = extractor.extract(&html, &url);
    tracing::debug!(
        "Extracted {} chars and {} images from {}",
        content.text.len(),
        content.images.len(),
        link
    );

    PageOutcome::Extracted {
        record: ArticleRecord::new(link, content.text, content.images),
        snapshot: PageSnapshot {
            html: keep_html.then_some(html),
            screenshot: result.screenshot,
        },
    }
}

fn parse_seeds(config: &Config) -> Result<Vec<Url>, ScribeError> {
    let seeds = config
        .seed_urls()
        .iter()
        .map(|seed| parse_http_url(seed))
        .collect::<Result<Vec<_>, _>>()?;

    if seeds.is_empty() {
        return Err(ConfigError::Validation("No seed URLs configured".to_string()).into());
    }
    Ok(seeds)
}

/// Builds the base fetcher for the configured strategy
async fn build_fetcher(config: &Config) -> Result<Arc<dyn PageFetcher>, ScribeError> {
    let strategy = config.crawler.fetch_strategy;
    match strategy {
        FetchStrategy::Plain | FetchStrategy::SessionHeaders => {
            tracing::debug!("Using {} fetch strategy", strategy.as_str());
            Ok(Arc::new(HttpFetcher::new(&config.user_agent, strategy)?))
        }
        FetchStrategy::Rendered => launch_browser(config).await,
    }
}

#[cfg(feature = "rendered")]
async fn launch_browser(config: &Config) -> Result<Arc<dyn PageFetcher>, ScribeError> {
    use crate::crawler::browser::RenderedFetcher;
    use crate::crawler::fetcher::BROWSER_USER_AGENT;

    let user_agent = config
        .user_agent
        .browser_override
        .as_deref()
        .unwrap_or(BROWSER_USER_AGENT);
    let fetcher = RenderedFetcher::launch(
        Duration::from_millis(config.crawler.settle_delay_ms),
        config.crawler.capture_screenshots,
        user_agent,
    )
    .await?;
    Ok(Arc::new(fetcher))
}

#[cfg(not(feature = "rendered"))]
async fn launch_browser(_config: &Config) -> Result<Arc<dyn PageFetcher>, ScribeError> {
    Err(ConfigError::Unsupported(
        "the rendered fetch strategy requires the `rendered` feature".to_string(),
    )
    .into())
}

/// Runs a complete crawl for a configuration
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(CrawlResult)` - Crawl completed
/// * `Err(ScribeError)` - Crawl aborted
pub async fn run_crawl(config: Config) -> Result<CrawlResult, ScribeError> {
    let coordinator = Coordinator::new(config).await?;
    coordinator.run().await
}
