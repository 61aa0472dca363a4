//! Markdown summary generation
//!
//! This module generates human-readable markdown summaries of crawl results,
//! including expansion and scrape statistics and a status code breakdown.

use crate::output::traits::{CrawlSummary, OutputResult};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Generates a markdown summary from crawl statistics
///
/// # Arguments
///
/// * `summary` - The crawl summary data
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(OutputError)` - Failed to write summary
pub fn generate_markdown_summary(summary: &CrawlSummary, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_summary(summary);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a crawl summary as markdown
///
/// # Arguments
///
/// * `summary` - The crawl summary data
///
/// # Returns
///
/// A formatted markdown string
pub fn format_markdown_summary(summary: &CrawlSummary) -> String {
    let mut md = String::new();

    md.push_str("# Sumi-Sift Crawl Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    if let Some(run_id) = summary.run_id {
        md.push_str(&format!("- **Run ID**: {}\n", run_id));
    }
    md.push_str(&format!("- **Root Sitemap**: {}\n", summary.root_url));
    md.push_str(&format!("- **Started**: {}\n", summary.started_at));
    if let Some(finished) = &summary.finished_at {
        md.push_str(&format!("- **Finished**: {}\n", finished));
    }
    if let Some(duration) = summary.duration_seconds {
        md.push_str(&format!(
            "- **Duration**: {} seconds ({:.2} minutes)\n",
            duration,
            duration as f64 / 60.0
        ));
    }
    md.push_str(&format!("- **Status**: {}\n", summary.status));
    md.push_str(&format!("- **Config Hash**: {}\n\n", summary.config_hash));

    md.push_str("## Sitemap Expansion\n\n");
    md.push_str(&format!(
        "- **Sitemaps Fetched**: {}\n",
        summary.sitemaps_fetched
    ));
    md.push_str(&format!(
        "- **Sitemaps Failed**: {}\n",
        summary.sitemaps_failed
    ));
    md.push_str(&format!("- **Leaf URLs**: {}\n\n", summary.leaf_urls));

    md.push_str("## Page Scrape\n\n");
    md.push_str("| Outcome | Count |\n");
    md.push_str("|---------|-------|\n");
    md.push_str(&format!("| Attempted | {} |\n", summary.pages_attempted));
    md.push_str(&format!("| Succeeded | {} |\n", summary.pages_succeeded));
    md.push_str(&format!("| Failed | {} |\n", summary.pages_failed));
    md.push_str(&format!("| Abandoned | {} |\n\n", summary.pages_abandoned));
    md.push_str(&format!(
        "- **Success Rate**: {:.2}%\n",
        summary.success_rate()
    ));
    md.push_str(&format!(
        "- **Error Rate**: {:.2}%\n\n",
        summary.error_rate()
    ));

    if !summary.status_breakdown.is_empty() {
        md.push_str("## HTTP Status Breakdown\n\n");
        md.push_str("| Status | Pages |\n");
        md.push_str("|--------|-------|\n");
        for (status, count) in &summary.status_breakdown {
            md.push_str(&format!("| {} | {} |\n", status, count));
        }
        md.push('\n');

        md.push_str("## Missing Metadata\n\n");
        md.push_str("| Field | Pages |\n");
        md.push_str("|-------|-------|\n");
        md.push_str(&format!("| title | {} |\n", summary.missing_title));
        md.push_str(&format!("| h1 | {} |\n", summary.missing_h1));
        md.push_str(&format!(
            "| meta description | {} |\n\n",
            summary.missing_description
        ));
    }

    md
}
