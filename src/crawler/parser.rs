//! Document parsing for sitemaps and pages
//!
//! This module handles parsing fetched documents to extract:
//! - `<loc>` values from sitemap indexes and urlsets
//! - Page metadata (title, first heading, meta description)
//!
//! Extraction is behind the `Parser` trait so new fields or strategies can be
//! added without touching the crawl engine.

use crate::crawler::record::{FetchedPage, PageRecord};
use crate::SiftError;
use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Extracts data from fetched documents
pub trait Parser: Send + Sync {
    /// Returns the text of every `<loc>` element in document order
    ///
    /// Sitemap indexes and urlsets use the same tag, so this serves both.
    fn extract_locations(&self, page: &FetchedPage) -> Result<Vec<String>, SiftError>;

    /// Builds a `PageRecord` from a fetched page
    ///
    /// URL and status code come from the response metadata; missing elements
    /// yield empty strings.
    fn page_metadata(&self, page: &FetchedPage) -> Result<PageRecord, SiftError>;
}

/// Selectable parser implementations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParserKind {
    /// Trims surrounding whitespace from extracted text
    #[default]
    Default,
    /// Keeps element text exactly as found in the document
    Verbatim,
}

impl ParserKind {
    /// Builds the parser this kind names
    pub fn build(self) -> Arc<dyn Parser> {
        match self {
            Self::Default => Arc::new(DefaultParser::new()),
            Self::Verbatim => Arc::new(DefaultParser::verbatim()),
        }
    }
}

impl FromStr for ParserKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "verbatim" => Ok(Self::Verbatim),
            other => Err(format!(
                "unknown parser '{}', expected 'default' or 'verbatim'",
                other
            )),
        }
    }
}

impl fmt::Display for ParserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "default"),
            Self::Verbatim => write!(f, "verbatim"),
        }
    }
}

/// scraper-based parser
#[derive(Debug, Clone)]
pub struct DefaultParser {
    trim_text: bool,
}

impl DefaultParser {
    /// Parser that trims extracted text
    pub fn new() -> Self {
        Self { trim_text: true }
    }

    /// Parser that keeps extracted text untouched
    pub fn verbatim() -> Self {
        Self { trim_text: false }
    }

    fn clean(&self, text: String) -> String {
        if self.trim_text {
            text.trim().to_string()
        } else {
            text
        }
    }
}

impl Default for DefaultParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for DefaultParser {
    fn extract_locations(&self, page: &FetchedPage) -> Result<Vec<String>, SiftError> {
        let document = Html::parse_document(&page.body);
        let loc_selector = selector("loc", &page.requested_url)?;

        // Locations are trimmed regardless of `trim_text`
        Ok(document
            .select(&loc_selector)
            .map(|element| element_text(element).trim().to_string())
            .collect())
    }

    fn page_metadata(&self, page: &FetchedPage) -> Result<PageRecord, SiftError> {
        let document = Html::parse_document(&page.body);

        let title = first_text(&document, "title", &page.requested_url)?;
        let h1 = first_text(&document, "h1", &page.requested_url)?;

        let meta_selector = selector("meta[name^=description]", &page.requested_url)?;
        let meta_description = document
            .select(&meta_selector)
            .next()
            .and_then(|element| element.value().attr("content"))
            .unwrap_or_default()
            .to_string();

        Ok(PageRecord {
            url: page.final_url.clone(),
            title: self.clean(title),
            h1: self.clean(h1),
            meta_description: self.clean(meta_description),
            status_code: page.status_code,
        })
    }
}

/// Parses a CSS selector, mapping failures onto a parse error for `url`
fn selector(css: &str, url: &str) -> Result<Selector, SiftError> {
    Selector::parse(css).map_err(|e| SiftError::Parse {
        url: url.to_string(),
        message: format!("invalid selector '{}': {:?}", css, e),
    })
}

/// Text of the first element matching `css`, or an empty string
fn first_text(document: &Html, css: &str, url: &str) -> Result<String, SiftError> {
    let sel = selector(css, url)?;
    Ok(document
        .select(&sel)
        .next()
        .map(element_text)
        .unwrap_or_default())
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>()
}
