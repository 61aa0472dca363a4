//! Integration tests for Sumi-Sift
//!
//! These tests use wiremock to serve sitemaps and pages and run the full
//! two-phase crawl through the real HTTP fetcher.

mod crawl_tests;
mod export_tests;

use sumi_sift::config::Config;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Renders a `urlset` document
pub fn urlset(locs: &[String]) -> String {
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
pub fn sitemap_index(locs: &[String]) -> String {
    let entries: String = locs
        .iter()
        .map(|loc| format!("<sitemap><loc>{}</loc></sitemap>", loc))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{}</sitemapindex>"#,
        entries
    )
}

/// Renders an HTML page with the given metadata
pub fn html_page(title: &str, h1: &str, description: &str) -> String {
    format!(
        r#"<!DOCTYPE html><html><head><title>{}</title><meta name="description" content="{}"></head><body><h1>{}</h1><p>Body</p></body></html>"#,
        title, description, h1
    )
}

/// Mounts a GET route answering with `status` and `body`
pub async fn mount(server: &MockServer, route: &str, status: u16, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

/// A config rooted at `/sitemap.xml` on the mock server
pub fn test_config(server: &MockServer) -> Config {
    let mut config = Config::for_root(format!("{}/sitemap.xml", server.uri()));
    config.crawler.concurrency = 4;
    config.crawler.request_timeout = 5;
    config
}
