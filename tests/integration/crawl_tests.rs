//! End-to-end crawls against a mock server

use crate::{html_page, mount, sitemap_index, test_config, urlset};
use std::time::Duration;
use sumi_sift::crawler::{run_crawl, PageRecord};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sorted(mut records: Vec<PageRecord>) -> Vec<PageRecord> {
    records.sort_by(|a, b| a.url.cmp(&b.url));
    records
}

#[tokio::test]
async fn test_crawl_flat_urlset() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount(
        &server,
        "/sitemap.xml",
        200,
        urlset(&[format!("{}/a", base), format!("{}/b", base)]),
    )
    .await;
    mount(&server, "/a", 200, html_page("Page A", "A", "First page")).await;
    mount(&server, "/b", 500, html_page("Page B", "B", "Second page")).await;

    let report = run_crawl(&test_config(&server), "hash").await.unwrap().report;

    assert_eq!(
        sorted(report.records),
        vec![
            PageRecord {
                url: format!("{}/a", base),
                title: "Page A".to_string(),
                h1: "A".to_string(),
                meta_description: "First page".to_string(),
                status_code: 200,
            },
            PageRecord {
                url: format!("{}/b", base),
                title: "Page B".to_string(),
                h1: "B".to_string(),
                meta_description: "Second page".to_string(),
                status_code: 500,
            },
        ]
    );
    assert_eq!(report.expansion.sitemaps_fetched, 1);
    assert_eq!(report.scrape.attempted, 2);
    assert!(!report.timed_out);
}

#[tokio::test]
async fn test_crawl_nested_sitemap_index() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount(
        &server,
        "/sitemap.xml",
        200,
        sitemap_index(&[format!("{}/posts.xml", base), format!("{}/pages.xml", base)]),
    )
    .await;
    mount(&server, "/posts.xml", 200, urlset(&[format!("{}/post-1", base)])).await;
    mount(
        &server,
        "/pages.xml",
        200,
        sitemap_index(&[format!("{}/pages-deep.xml", base)]),
    )
    .await;
    mount(&server, "/pages-deep.xml", 200, urlset(&[format!("{}/about", base)])).await;
    mount(&server, "/post-1", 200, html_page("Post", "Post 1", "")).await;
    mount(&server, "/about", 200, html_page("About", "About us", "Who we are")).await;

    let report = run_crawl(&test_config(&server), "hash").await.unwrap().report;

    let records = sorted(report.records);
    let urls: Vec<&str> = records.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![format!("{}/about", base), format!("{}/post-1", base)]
    );
    assert_eq!(report.expansion.sitemaps_fetched, 4);
    assert_eq!(report.expansion.leaf_urls, 2);
}

#[tokio::test]
async fn test_request_timeout_drops_slow_page() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount(
        &server,
        "/sitemap.xml",
        200,
        urlset(&[
            format!("{}/a", base),
            format!("{}/slow", base),
            format!("{}/c", base),
        ]),
    )
    .await;
    mount(&server, "/a", 200, html_page("A", "A", "")).await;
    mount(&server, "/c", 200, html_page("C", "C", "")).await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html_page("Slow", "Slow", ""))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let mut config = test_config(&server);
    config.crawler.request_timeout = 1;

    let report = run_crawl(&config, "hash").await.unwrap().report;

    let records = sorted(report.records);
    let urls: Vec<&str> = records.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(urls, vec![format!("{}/a", base), format!("{}/c", base)]);
    assert_eq!(report.scrape.fetch_failed, 1);
}

#[tokio::test]
async fn test_configured_user_agent_is_sent() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount(&server, "/sitemap.xml", 200, urlset(&[format!("{}/a", base)])).await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .and(header("user-agent", "SiftTestBot/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html_page("A", "A", "")))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = test_config(&server);
    config.user_agent.pool = vec!["SiftTestBot/1.0".to_string()];

    let report = run_crawl(&config, "hash").await.unwrap().report;

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].status_code, 200);
}

#[tokio::test]
async fn test_redirected_page_records_final_url() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount(&server, "/sitemap.xml", 200, urlset(&[format!("{}/old", base)])).await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new"))
        .mount(&server)
        .await;
    mount(&server, "/new", 200, html_page("New", "New home", "")).await;

    let report = run_crawl(&test_config(&server), "hash").await.unwrap().report;

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].url, format!("{}/new", base));
    assert_eq!(report.records[0].title, "New");
}

#[tokio::test]
async fn test_missing_root_sitemap_yields_nothing() {
    let server = MockServer::start().await;

    let report = run_crawl(&test_config(&server), "hash").await.unwrap().report;

    assert!(report.records.is_empty());
    assert_eq!(report.expansion.leaf_urls, 0);
    assert_eq!(report.scrape.attempted, 0);
}

#[tokio::test]
async fn test_crawl_timeout_returns_partial_report() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount(
        &server,
        "/sitemap.xml",
        200,
        sitemap_index(&[format!("{}/fast.xml", base), format!("{}/stuck.xml", base)]),
    )
    .await;
    mount(&server, "/fast.xml", 200, urlset(&[format!("{}/a", base)])).await;
    Mock::given(method("GET"))
        .and(path("/stuck.xml"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(urlset(&[format!("{}/b", base)]))
                .set_delay(Duration::from_secs(30)),
        )
        .mount(&server)
        .await;

    let mut config = test_config(&server);
    config.crawler.request_timeout = 60;
    config.crawler.crawl_timeout = Some(1);

    let report = run_crawl(&config, "hash").await.unwrap().report;

    assert!(report.timed_out);
    assert!(report.records.is_empty());
    assert_eq!(report.expansion.leaf_urls, 1);
    assert_eq!(report.scrape.abandoned, 1);
}
