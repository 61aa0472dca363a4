//! Crawls exported to SQLite and markdown

use crate::{html_page, mount, test_config, urlset};
use std::path::Path;
use sumi_sift::config::load_config_with_hash;
use sumi_sift::crawler::run_crawl;
use sumi_sift::output::generate_summary;
use sumi_sift::storage::{RunStatus, SqliteStorage, Storage};
use wiremock::MockServer;

async fn serve_two_pages(server: &MockServer) {
    let base = server.uri();
    mount(
        server,
        "/sitemap.xml",
        200,
        urlset(&[format!("{}/a", base), format!("{}/missing", base)]),
    )
    .await;
    mount(server, "/a", 200, html_page("A", "Alpha", "About A")).await;
    mount(server, "/missing", 404, html_page("Not Found", "", "")).await;
}

#[tokio::test]
async fn test_crawl_exports_run_and_records() {
    let server = MockServer::start().await;
    serve_two_pages(&server).await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("sift.db");
    let summary_path = dir.path().join("summary.md");

    let mut config = test_config(&server);
    config.output.database_path = Some(db_path.to_string_lossy().into_owned());
    config.output.summary_path = Some(summary_path.to_string_lossy().into_owned());

    let outcome = run_crawl(&config, "export-hash").await.unwrap();
    assert!(outcome.export.is_ok());
    assert_eq!(outcome.report.records.len(), 2);

    let storage = SqliteStorage::new(&db_path).unwrap();
    let run = storage.get_latest_run().unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.config_hash, "export-hash");
    assert_eq!(run.root_url, config.crawler.root_url);
    assert_eq!(run.counts.pages_attempted, 2);
    assert_eq!(run.counts.pages_succeeded, 2);
    assert_eq!(storage.count_records(run.id).unwrap(), 2);

    let mut stored = storage.load_records(run.id).unwrap();
    stored.sort_by_key(|record| record.status_code);
    assert_eq!(stored[0].title, "A");
    assert_eq!(stored[1].status_code, 404);

    let markdown = std::fs::read_to_string(&summary_path).unwrap();
    assert!(markdown.contains("# Sumi-Sift Crawl Summary"));
    assert!(markdown.contains("| 404 | 1 |"));
}

#[tokio::test]
async fn test_summary_from_stored_run() {
    let server = MockServer::start().await;
    serve_two_pages(&server).await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("sift.db");

    let mut config = test_config(&server);
    config.output.database_path = Some(db_path.to_string_lossy().into_owned());

    run_crawl(&config, "first").await.unwrap().export.unwrap();
    run_crawl(&config, "second").await.unwrap().export.unwrap();

    let storage = SqliteStorage::new(&db_path).unwrap();
    assert_eq!(storage.count_runs().unwrap(), 2);

    let summary = generate_summary(&storage).unwrap();
    assert_eq!(summary.config_hash, "second");
    assert_eq!(summary.pages_succeeded, 2);
    assert_eq!(summary.missing_h1, 1);
    assert!(summary.duration_seconds.is_some());
}

#[tokio::test]
async fn test_failed_summary_keeps_report_and_stored_run() {
    let server = MockServer::start().await;
    serve_two_pages(&server).await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("sift.db");
    let summary_path = dir.path().join("no").join("such").join("dir").join("summary.md");

    let mut config = test_config(&server);
    config.output.database_path = Some(db_path.to_string_lossy().into_owned());
    config.output.summary_path = Some(summary_path.to_string_lossy().into_owned());

    let outcome = run_crawl(&config, "hash").await.unwrap();
    assert!(outcome.export.is_err());
    assert_eq!(outcome.report.records.len(), 2);
    assert!(!summary_path.exists());

    let storage = SqliteStorage::new(&db_path).unwrap();
    let run = storage.get_latest_run().unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(storage.count_records(run.id).unwrap(), 2);
}

#[tokio::test]
async fn test_crawl_from_config_file() {
    let server = MockServer::start().await;
    serve_two_pages(&server).await;

    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("sift.toml");
    std::fs::write(
        &config_path,
        format!(
            r#"
[crawler]
root-url = "{}/sitemap.xml"
concurrency = 2
request-timeout = 5
parser = "verbatim"

[user-agent]
pool = ["SiftTestBot/1.0"]
"#,
            server.uri()
        ),
    )
    .unwrap();

    let (config, hash) = load_config_with_hash(Path::new(&config_path)).unwrap();
    assert_eq!(hash.len(), 64);

    let report = run_crawl(&config, &hash).await.unwrap().report;
    assert_eq!(report.records.len(), 2);
}
