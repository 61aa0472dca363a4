//! Sitemap frontier expansion
//!
//! Walks a sitemap index tree from the root and collects every leaf page URL.
//! Each sitemap document is fetched by its own task with no concurrency cap;
//! the loop draining the worklist owns the leaf accumulator and spawns a new
//! task for every nested sitemap reference.
//!
//! No visited-set is kept: a sitemap listed twice is expanded twice. Cycles
//! are cut off by `max_sitemap_depth` and, if set, the crawl deadline.

use crate::crawler::classifier::partition;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::parser::Parser;
use crate::crawler::worklist::Worklist;
use crate::config::DEFAULT_MAX_SITEMAP_DEPTH;
use crate::SiftError;
use std::sync::Arc;
use tokio::time::Instant;

/// Tuning for a frontier expansion
#[derive(Debug, Clone, Copy)]
pub struct ExpandOptions {
    /// Nested sitemaps deeper than this are not fetched (root is depth 0)
    pub max_sitemap_depth: u32,
    /// Wall-clock bound on the whole expansion
    pub deadline: Option<Instant>,
}

impl Default for ExpandOptions {
    fn default() -> Self {
        Self {
            max_sitemap_depth: DEFAULT_MAX_SITEMAP_DEPTH,
            deadline: None,
        }
    }
}

/// Counts describing how the expansion went
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpansionStats {
    /// Sitemap documents fetched and parsed
    pub sitemaps_fetched: usize,
    /// Sitemap documents that could not be fetched or parsed
    pub sitemaps_failed: usize,
    /// Nested sitemap references skipped by the depth limit
    pub depth_limited: usize,
    /// Sitemap tasks cut off by the deadline or lost to a panic
    pub abandoned: usize,
    /// Leaf page URLs discovered (duplicates included)
    pub leaf_urls: usize,
}

/// Output of a frontier expansion
#[derive(Debug, Clone, Default)]
pub struct ExpansionReport {
    /// Leaf page URLs, unordered, possibly with duplicates
    pub leaf_urls: Vec<String>,
    pub stats: ExpansionStats,
    /// True if the deadline ended the expansion early
    pub timed_out: bool,
}

/// Result of fetching and classifying one sitemap document
struct SitemapVisit {
    url: String,
    depth: u32,
    children: Result<(Vec<String>, Vec<String>), SiftError>,
}

/// Expands `root_url` into the flat list of leaf page URLs
///
/// Failures on individual sitemaps are logged and contribute nothing; the
/// expansion itself never fails.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use sumi_sift::crawler::{expand, DefaultParser, ExpandOptions, HttpFetcher, UserAgentPool};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let fetcher = Arc::new(HttpFetcher::new(Duration::from_secs(10), UserAgentPool::default())?);
/// let parser = Arc::new(DefaultParser::new());
/// let report = expand("https://example.com/sitemap.xml", fetcher, parser, &ExpandOptions::default()).await;
/// println!("{} pages", report.leaf_urls.len());
/// # Ok(())
/// # }
/// ```
pub async fn expand(
    root_url: &str,
    fetcher: Arc<dyn Fetcher>,
    parser: Arc<dyn Parser>,
    options: &ExpandOptions,
) -> ExpansionReport {
    tracing::info!("Expanding sitemap tree from {}", root_url);

    let mut worklist = Worklist::new(options.deadline);
    let mut leaf_urls = Vec::new();
    let mut stats = ExpansionStats::default();

    worklist.spawn(visit_sitemap(
        root_url.to_string(),
        0,
        fetcher.clone(),
        parser.clone(),
    ));

    while let Some(visit) = worklist.next().await {
        let (sitemaps, pages) = match visit.children {
            Ok(children) => children,
            Err(e) => {
                tracing::warn!("Failed to expand sitemap {}: {}", visit.url, e);
                stats.sitemaps_failed += 1;
                continue;
            }
        };

        stats.sitemaps_fetched += 1;
        tracing::debug!(
            "Sitemap {} (depth {}): {} nested sitemaps, {} pages",
            visit.url,
            visit.depth,
            sitemaps.len(),
            pages.len()
        );

        let child_depth = visit.depth + 1;
        for sitemap in sitemaps {
            if child_depth > options.max_sitemap_depth {
                tracing::warn!(
                    "Skipping sitemap {} nested beyond depth {}",
                    sitemap,
                    options.max_sitemap_depth
                );
                stats.depth_limited += 1;
                continue;
            }
            worklist.spawn(visit_sitemap(
                sitemap,
                child_depth,
                fetcher.clone(),
                parser.clone(),
            ));
        }

        leaf_urls.extend(pages);
    }

    stats.abandoned = worklist.abandoned();
    stats.leaf_urls = leaf_urls.len();

    tracing::info!(
        "Sitemap expansion done: {} sitemaps fetched, {} failed, {} leaf URLs",
        stats.sitemaps_fetched,
        stats.sitemaps_failed,
        stats.leaf_urls
    );

    ExpansionReport {
        leaf_urls,
        stats,
        timed_out: worklist.is_expired(),
    }
}

/// Fetches one sitemap document and classifies its `<loc>` values
async fn visit_sitemap(
    url: String,
    depth: u32,
    fetcher: Arc<dyn Fetcher>,
    parser: Arc<dyn Parser>,
) -> SitemapVisit {
    tracing::debug!("Fetching sitemap: {}", url);

    let children = match fetcher.fetch(&url).await {
        Ok(page) => {
            if !page.is_success() {
                tracing::debug!("Sitemap {} returned HTTP {}", url, page.status_code);
            }
            parser
                .extract_locations(&page)
                .map(|locations| partition(&locations))
        }
        Err(e) => Err(e),
    };

    SitemapVisit {
        url,
        depth,
        children,
    }
}
