//! Instrumented stub fetcher for crawl engine tests

use crate::crawler::fetcher::Fetcher;
use crate::crawler::record::FetchedPage;
use crate::SiftError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

enum StubResponse {
    Page {
        status_code: u16,
        final_url: Option<String>,
        body: String,
    },
    Timeout,
    Hang,
}

/// Serves canned documents and tracks how many fetches overlap
pub(crate) struct StubFetcher {
    responses: HashMap<String, StubResponse>,
    delay: Duration,
    active: AtomicUsize,
    max_active: AtomicUsize,
    calls: AtomicUsize,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            delay: Duration::ZERO,
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_page(self, url: &str, body: &str) -> Self {
        self.with_status(url, 200, body)
    }

    pub fn with_status(mut self, url: &str, status_code: u16, body: &str) -> Self {
        self.responses.insert(
            url.to_string(),
            StubResponse::Page {
                status_code,
                final_url: None,
                body: body.to_string(),
            },
        );
        self
    }

    pub fn with_redirect(mut self, url: &str, final_url: &str, body: &str) -> Self {
        self.responses.insert(
            url.to_string(),
            StubResponse::Page {
                status_code: 200,
                final_url: Some(final_url.to_string()),
                body: body.to_string(),
            },
        );
        self
    }

    pub fn with_timeout(mut self, url: &str) -> Self {
        self.responses.insert(url.to_string(), StubResponse::Timeout);
        self
    }

    pub fn with_hang(mut self, url: &str) -> Self {
        self.responses.insert(url.to_string(), StubResponse::Hang);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Highest number of fetches observed in flight at once
    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, SiftError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now_active, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let result = match self.responses.get(url) {
            Some(StubResponse::Page {
                status_code,
                final_url,
                body,
            }) => Ok(FetchedPage {
                requested_url: url.to_string(),
                final_url: final_url.clone().unwrap_or_else(|| url.to_string()),
                status_code: *status_code,
                body: body.clone(),
            }),
            Some(StubResponse::Hang) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(SiftError::Timeout {
                    url: url.to_string(),
                })
            }
            Some(StubResponse::Timeout) | None => Err(SiftError::Timeout {
                url: url.to_string(),
            }),
        };

        self.active.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// Renders a `urlset` document
pub(crate) fn urlset(locs: &[&str]) -> String {
    let entries: String = locs
        .iter()
        .map(|loc| format!("<url><loc>{}</loc></url>", loc))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{}</urlset>"#,
        entries
    )
}

/// Renders a `sitemapindex` document
pub(crate) fn sitemap_index(locs: &[&str]) -> String {
    let entries: String = locs
        .iter()
        .map(|loc| format!("<sitemap><loc>{}</loc></sitemap>", loc))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{}</sitemapindex>"#,
        entries
    )
}

/// Renders a page with the given metadata
pub(crate) fn html_page(title: &str, h1: &str, description: &str) -> String {
    format!(
        r#"<html><head><title>{}</title><meta name="description" content="{}"></head><body><h1>{}</h1></body></html>"#,
        title, description, h1
    )
}
