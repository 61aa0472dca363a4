//! Console output of crawl results
//!
//! This module prints scraped records and crawl statistics to stdout.

use crate::crawler::PageRecord;
use crate::output::traits::CrawlSummary;

/// Formats one record as a single tab-separated line
pub fn format_record(record: &PageRecord) -> String {
    format!(
        "{}\t{}\t{}\t{}\t{}",
        record.status_code, record.url, record.title, record.h1, record.meta_description
    )
}

/// Prints every record, one per line
pub fn print_records(records: &[PageRecord]) {
    for record in records {
        println!("{}", format_record(record));
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `summary` - The statistics to display
pub fn print_statistics(summary: &CrawlSummary) {
    println!("=== Crawl Statistics ===\n");

    println!("Run:");
    if let Some(run_id) = summary.run_id {
        println!("  Run ID: {}", run_id);
    }
    println!("  Root sitemap: {}", summary.root_url);
    println!("  Status: {}", summary.status);
    if let Some(duration) = summary.duration_seconds {
        println!("  Duration: {}s", duration);
    }
    println!();

    println!("Sitemap Expansion:");
    println!("  Sitemaps fetched: {}", summary.sitemaps_fetched);
    println!("  Sitemaps failed: {}", summary.sitemaps_failed);
    println!("  Leaf URLs: {}", summary.leaf_urls);
    println!();

    println!("Page Scrape:");
    println!("  Attempted: {}", summary.pages_attempted);
    println!("  Succeeded: {}", summary.pages_succeeded);
    println!("  Failed: {}", summary.pages_failed);
    println!("  Abandoned: {}", summary.pages_abandoned);
    println!();

    if !summary.status_breakdown.is_empty() {
        println!("Pages by HTTP Status:");
        let total = summary.total_records();
        for (status, count) in &summary.status_breakdown {
            let percentage = (*count as f64 / total as f64) * 100.0;
            println!("  {}: {} ({:.1}%)", status, count, percentage);
        }
        println!();

        println!("Missing Metadata:");
        println!("  title: {}", summary.missing_title);
        println!("  h1: {}", summary.missing_h1);
        println!("  meta description: {}", summary.missing_description);
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} pages successfully scraped)",
        summary.success_rate(),
        summary.pages_succeeded,
        summary.pages_attempted
    );
}
