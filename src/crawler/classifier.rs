//! URL classification
//!
//! Splits the `<loc>` values of a sitemap into references to further sitemap
//! documents and leaf pages. A URL is treated as a sitemap reference when it
//! contains the substring `xml` anywhere (case-sensitive). Ordinary pages
//! whose path happens to contain `xml` are misclassified; that is a known
//! limitation of the heuristic.

/// Kind of URL found in a sitemap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UrlKind {
    /// Another sitemap document (index or urlset) to expand
    Sitemap,
    /// A leaf page to scrape
    Page,
}

/// Classifies a single URL
pub fn classify(url: &str) -> UrlKind {
    if url.contains("xml") {
        UrlKind::Sitemap
    } else {
        UrlKind::Page
    }
}

/// Partitions URLs into `(sitemap_refs, page_refs)`
///
/// Every input URL lands in exactly one of the two outputs and relative order
/// is preserved within each.
///
/// # Example
///
/// ```
/// use sumi_sift::partition;
///
/// let urls = vec![
///     "https://example.com/sitemap-posts.xml".to_string(),
///     "https://example.com/about".to_string(),
/// ];
/// let (sitemaps, pages) = partition(&urls);
/// assert_eq!(sitemaps, vec!["https://example.com/sitemap-posts.xml"]);
/// assert_eq!(pages, vec!["https://example.com/about"]);
/// ```
pub fn partition(urls: &[String]) -> (Vec<String>, Vec<String>) {
    let mut sitemaps = Vec::new();
    let mut pages = Vec::new();

    for url in urls {
        match classify(url) {
            UrlKind::Sitemap => {
                tracing::debug!("Found sitemap: {}", url);
                sitemaps.push(url.clone());
            }
            UrlKind::Page => pages.push(url.clone()),
        }
    }

    (sitemaps, pages)
}
