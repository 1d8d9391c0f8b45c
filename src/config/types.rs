use serde::Deserialize;

/// Default exclusion keywords applied to discovered links
pub const DEFAULT_EXCLUDE_KEYWORDS: &[&str] = &[
    "ads",
    "advertisement",
    "subscribe",
    "login",
    "register",
    "instagram",
    "academy",
];

/// Default "next page" anchor labels
pub const DEFAULT_NEXT_LABELS: &[&str] = &["Next", "다음"];

/// Main configuration structure for Sumi-Scribe
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Seed URLs to start from
    #[serde(default)]
    pub seeds: Vec<String>,

    /// Newline-separated seed list, appended to `seeds`
    #[serde(rename = "seed-list", default)]
    pub seed_list: Option<String>,

    #[serde(default)]
    pub crawler: CrawlerConfig,

    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,

    #[serde(default)]
    pub filter: FilterConfig,

    #[serde(default)]
    pub extraction: ExtractionConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Returns every seed URL, combining `seeds` and the lines of `seed-list`
    ///
    /// Blank lines are skipped and duplicates are dropped while keeping the
    /// first occurrence.
    pub fn seed_urls(&self) -> Vec<String> {
        let mut seeds: Vec<String> = Vec::new();
        let listed = self
            .seed_list
            .as_deref()
            .map(parse_seed_list)
            .unwrap_or_default();

        for seed in self.seeds.iter().cloned().chain(listed) {
            let seed = seed.trim().to_string();
            if !seed.is_empty() && !seeds.contains(&seed) {
                seeds.push(seed);
            }
        }

        seeds
    }
}

/// Splits a newline-separated list of seed URLs
pub fn parse_seed_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// How the list of article pages is discovered from a seed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiscoveryMode {
    /// Follow "next page" anchors across a paginated listing
    Pagination,
    /// Read `<origin>/sitemap.xml`
    Sitemap,
    /// Take the links of the seed page only
    SinglePage,
}

/// How page HTML is retrieved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FetchStrategy {
    /// Single GET with the crawler's identity user agent
    Plain,
    /// Shared cookie store and browser-like headers
    SessionHeaders,
    /// Headless browser DOM snapshot
    Rendered,
}

impl FetchStrategy {
    /// Returns the strategy's configuration name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::SessionHeaders => "session-headers",
            Self::Rendered => "rendered",
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CrawlerConfig {
    pub discovery_mode: DiscoveryMode,

    pub fetch_strategy: FetchStrategy,

    /// Maximum number of article fetches in flight
    pub max_concurrent_fetches: u32,

    /// Per-request timeout for HTTP strategies (seconds)
    pub timeout_secs: u64,

    /// Total attempts per page fetch, including the first
    pub max_attempts: u32,

    /// Fixed delay between attempts (milliseconds)
    pub retry_delay_ms: u64,

    /// Wait after navigation before the DOM snapshot (milliseconds)
    pub settle_delay_ms: u64,

    /// Upper bound on listing pages visited in pagination mode
    pub max_pages: u32,

    /// Exact anchor texts that mark the next listing page
    pub next_labels: Vec<String>,

    /// Capture a full-page screenshot with the rendered strategy
    pub capture_screenshots: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            discovery_mode: DiscoveryMode::SinglePage,
            fetch_strategy: FetchStrategy::Plain,
            max_concurrent_fetches: 8,
            timeout_secs: 10,
            max_attempts: 3,
            retry_delay_ms: 500,
            settle_delay_ms: 3000,
            max_pages: 500,
            next_labels: DEFAULT_NEXT_LABELS.iter().map(|s| s.to_string()).collect(),
            capture_screenshots: false,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    pub crawler_name: String,

    /// Version of the crawler
    pub crawler_version: String,

    /// URL with information about the crawler
    pub contact_url: Option<String>,

    /// Email address for crawler-related contact
    pub contact_email: Option<String>,

    /// User agent sent by the session-headers strategy instead of the
    /// built-in browser string
    pub browser_override: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "SumiScribe".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
            contact_email: None,
            browser_override: None,
        }
    }
}

impl UserAgentConfig {
    /// Formats the identity user agent: `Name/Version (+ContactURL; ContactEmail)`
    pub fn identity(&self) -> String {
        let contact: Vec<&str> = [self.contact_url.as_deref(), self.contact_email.as_deref()]
            .into_iter()
            .flatten()
            .collect();

        if contact.is_empty() {
            format!("{}/{}", self.crawler_name, self.crawler_version)
        } else {
            format!(
                "{}/{} (+{})",
                self.crawler_name,
                self.crawler_version,
                contact.join("; ")
            )
        }
    }
}

/// Keyword exclusion configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct FilterConfig {
    /// Substrings that exclude a URL when present anywhere in it
    pub exclude_keywords: Vec<String>,

    /// Match keywords with exact case
    pub case_sensitive: bool,

    /// Apply the keyword filter to image URLs as well
    pub filter_images: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            exclude_keywords: DEFAULT_EXCLUDE_KEYWORDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            case_sensitive: true,
            filter_images: false,
        }
    }
}

/// Content selection policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractionPolicy {
    /// First container with more than `min-paragraphs` direct paragraphs
    Heuristic,
    /// Every paragraph on the page
    Flat,
}

/// Content extraction configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ExtractionConfig {
    pub policy: ExtractionPolicy,

    /// A container qualifies when its direct paragraph count exceeds this
    pub min_paragraphs: usize,

    /// Include h1-h6 text with the flat policy
    pub include_headings: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            policy: ExtractionPolicy::Heuristic,
            min_paragraphs: 3,
            include_headings: false,
        }
    }
}

/// Export file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
    Pdf,
    Xlsx,
}

impl ExportFormat {
    /// File extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Pdf => "pdf",
            Self::Xlsx => "xlsx",
        }
    }

    /// Parses a format name, ignoring case
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            "pdf" => Some(Self::Pdf),
            "xlsx" => Some(Self::Xlsx),
            _ => None,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct OutputConfig {
    /// Directory receiving every artifact
    pub directory: String,

    /// File stem for the aggregate exports
    pub basename: String,

    pub formats: Vec<ExportFormat>,

    /// Write `page_<index>/` directories with data.json and snapshots
    pub page_directories: bool,

    /// Download image files into the page directories
    pub download_images: bool,

    /// Write one PDF per article under `articles/`
    pub pdf_per_article: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "output".to_string(),
            basename: "articles".to_string(),
            formats: vec![ExportFormat::Csv, ExportFormat::Json],
            page_directories: false,
            download_images: false,
            pdf_per_article: false,
        }
    }
}
