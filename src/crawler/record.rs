//! Crawl data model
//!
//! Types flowing between the fetcher, the parser and the result aggregator.

use crate::SiftError;

/// Metadata scraped from a single page
///
/// Built once, when a page has been fetched and parsed successfully, and
/// never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    /// Final URL of the page (after redirects)
    pub url: String,

    /// Text of the first `<title>` element
    pub title: String,

    /// Text of the first `<h1>` element
    pub h1: String,

    /// `content` of the first `meta[name^=description]` element
    pub meta_description: String,

    /// HTTP status code of the response
    pub status_code: u16,
}

/// A fetched document together with its response metadata
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL that was requested
    pub requested_url: String,

    /// URL the response was served from after redirects
    pub final_url: String,

    /// HTTP status code
    pub status_code: u16,

    /// Response body
    pub body: String,
}

impl FetchedPage {
    /// Builds a 200 response whose final URL equals the requested URL
    pub fn ok(url: impl Into<String>, body: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            final_url: url.clone(),
            requested_url: url,
            status_code: 200,
            body: body.into(),
        }
    }

    /// Returns true for 2xx responses
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// What a single scrape task reports back to the aggregator
#[derive(Debug)]
pub enum ScrapeOutcome {
    /// The page was fetched and its metadata extracted
    Scraped(PageRecord),

    /// The request failed at the transport level
    FetchFailed { url: String, error: SiftError },

    /// The response could not be turned into a record
    ParseFailed { url: String, error: SiftError },
}
