use crate::crawler::ParserKind;
use serde::Deserialize;
use std::time::Duration;

/// Default number of concurrent page fetches during the scrape phase
pub const DEFAULT_CONCURRENCY: u32 = 10;

/// Default per-request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Default maximum nesting depth of sitemap indexes
pub const DEFAULT_MAX_SITEMAP_DEPTH: u32 = 16;

/// Main configuration structure for Sumi-Sift
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Builds a configuration with defaults for everything but the root URL
    pub fn for_root(root_url: impl Into<String>) -> Self {
        Self {
            crawler: CrawlerConfig::for_root(root_url),
            user_agent: UserAgentConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Root sitemap URL the crawl starts from
    #[serde(rename = "root-url")]
    pub root_url: String,

    /// Maximum number of concurrent page fetches
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout", default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Overall crawl deadline covering both phases (seconds)
    #[serde(rename = "crawl-timeout", default)]
    pub crawl_timeout: Option<u64>,

    /// Sitemap references nested deeper than this are not fetched
    #[serde(rename = "max-sitemap-depth", default = "default_max_sitemap_depth")]
    pub max_sitemap_depth: u32,

    /// Which metadata extractor to use
    #[serde(default)]
    pub parser: ParserKind,
}

impl CrawlerConfig {
    pub fn for_root(root_url: impl Into<String>) -> Self {
        Self {
            root_url: root_url.into(),
            concurrency: DEFAULT_CONCURRENCY,
            request_timeout: DEFAULT_REQUEST_TIMEOUT_SECS,
            crawl_timeout: None,
            max_sitemap_depth: DEFAULT_MAX_SITEMAP_DEPTH,
            parser: ParserKind::default(),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn crawl_timeout(&self) -> Option<Duration> {
        self.crawl_timeout.map(Duration::from_secs)
    }
}

/// User agent rotation configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserAgentConfig {
    /// User-Agent strings to rotate through; empty means the built-in pool
    #[serde(default)]
    pub pool: Vec<String>,
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file records are exported to
    #[serde(rename = "database-path", default)]
    pub database_path: Option<String>,

    /// Path to the markdown summary file
    #[serde(rename = "summary-path", default)]
    pub summary_path: Option<String>,
}

fn default_concurrency() -> u32 {
    DEFAULT_CONCURRENCY
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_max_sitemap_depth() -> u32 {
    DEFAULT_MAX_SITEMAP_DEPTH
}
