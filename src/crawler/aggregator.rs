//! Result aggregation for the scrape phase
//!
//! The aggregator is owned by the single loop that drains the scrape
//! worklist, so every record and counter is written from one place.

use crate::crawler::record::{PageRecord, ScrapeOutcome};

/// Counts describing how the scrape phase went
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrapeStats {
    /// Units spawned (non-empty URLs)
    pub attempted: usize,
    /// Records produced
    pub succeeded: usize,
    /// Transport failures
    pub fetch_failed: usize,
    /// Responses that could not be parsed
    pub parse_failed: usize,
    /// Empty URLs skipped without a fetch
    pub skipped_empty: usize,
    /// Units cut off by the crawl deadline, lost to a panic or never started
    pub abandoned: usize,
}

impl ScrapeStats {
    /// Total failed URLs
    pub fn failed(&self) -> usize {
        self.fetch_failed + self.parse_failed
    }
}

/// Output of the scrape phase
#[derive(Debug, Clone, Default)]
pub struct ScrapeReport {
    /// One record per successfully scraped page, in completion order
    pub records: Vec<PageRecord>,
    pub stats: ScrapeStats,
    /// True if the crawl deadline ended the phase early
    pub timed_out: bool,
}

/// Collects scrape outcomes into records and counters
#[derive(Debug, Default)]
pub struct ResultAggregator {
    records: Vec<PageRecord>,
    stats: ScrapeStats,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notes that a unit was spawned for a URL
    pub fn record_attempt(&mut self) {
        self.stats.attempted += 1;
    }

    /// Notes that an empty URL was skipped
    pub fn record_skipped(&mut self) {
        self.stats.skipped_empty += 1;
    }

    /// Records the outcome of one scrape unit
    pub fn record(&mut self, outcome: ScrapeOutcome) {
        match outcome {
            ScrapeOutcome::Scraped(record) => {
                self.stats.succeeded += 1;
                self.records.push(record);
            }
            ScrapeOutcome::FetchFailed { .. } => self.stats.fetch_failed += 1,
            ScrapeOutcome::ParseFailed { .. } => self.stats.parse_failed += 1,
        }
    }

    /// Notes that a spawned unit finished without running
    pub fn record_abandoned(&mut self) {
        self.stats.abandoned += 1;
    }

    /// Number of records collected so far
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Hands the collected records over
    ///
    /// `abandoned` units the worklist never handed back are added to those
    /// already recorded.
    pub fn finish(mut self, abandoned: usize, timed_out: bool) -> ScrapeReport {
        self.stats.abandoned += abandoned;
        ScrapeReport {
            records: self.records,
            stats: self.stats,
            timed_out,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SiftError;

    fn record(url: &str) -> PageRecord {
        PageRecord {
            url: url.to_string(),
            title: String::new(),
            h1: String::new(),
            meta_description: String::new(),
            status_code: 200,
        }
    }

    #[test]
    fn test_aggregates_outcomes() {
        let mut aggregator = ResultAggregator::new();
        for _ in 0..4 {
            aggregator.record_attempt();
        }
        aggregator.record_skipped();

        aggregator.record(ScrapeOutcome::Scraped(record("https://example.com/a")));
        aggregator.record(ScrapeOutcome::Scraped(record("https://example.com/b")));
        aggregator.record(ScrapeOutcome::FetchFailed {
            url: "https://example.com/c".to_string(),
            error: SiftError::Timeout {
                url: "https://example.com/c".to_string(),
            },
        });
        aggregator.record(ScrapeOutcome::ParseFailed {
            url: "https://example.com/d".to_string(),
            error: SiftError::Parse {
                url: "https://example.com/d".to_string(),
                message: "bad".to_string(),
            },
        });

        assert_eq!(aggregator.len(), 2);

        let report = aggregator.finish(0, false);
        assert_eq!(report.records.len(), 2);
        assert_eq!(
            report.stats,
            ScrapeStats {
                attempted: 4,
                succeeded: 2,
                fetch_failed: 1,
                parse_failed: 1,
                skipped_empty: 1,
                abandoned: 0,
            }
        );
        assert_eq!(report.stats.failed(), 2);
        assert!(!report.timed_out);
    }

    #[test]
    fn test_finish_records_abandoned() {
        let aggregator = ResultAggregator::new();
        assert!(aggregator.is_empty());

        let report = aggregator.finish(3, true);
        assert_eq!(report.stats.abandoned, 3);
        assert!(report.timed_out);
    }

    #[test]
    fn test_abandoned_units_add_up() {
        let mut aggregator = ResultAggregator::new();
        for _ in 0..3 {
            aggregator.record_attempt();
        }
        aggregator.record_abandoned();

        let report = aggregator.finish(2, true);
        assert_eq!(report.stats.attempted, 3);
        assert_eq!(report.stats.abandoned, 3);
        assert!(report.records.is_empty());
    }
}
