//! Configuration module for Sumi-Scribe
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use sumi_scribe::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("scribe.toml")).unwrap();
//! println!("Discovery mode: {:?}", config.crawler.discovery_mode);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    parse_seed_list, Config, CrawlerConfig, DiscoveryMode, ExportFormat, ExtractionConfig,
    ExtractionPolicy, FetchStrategy, FilterConfig, OutputConfig, UserAgentConfig,
    DEFAULT_EXCLUDE_KEYWORDS, DEFAULT_NEXT_LABELS,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
