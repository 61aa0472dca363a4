//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - The `Fetcher` capability the crawl engine is written against
//! - Building the shared reqwest client with the per-request timeout
//! - Rotating the User-Agent header across a fixed pool
//! - Error classification (timeout vs. other transport failures)
//!
//! A non-2xx response is not an error: its status code is carried through to
//! the scraped record.

use crate::crawler::record::FetchedPage;
use crate::SiftError;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use reqwest::header::USER_AGENT;
use reqwest::Client;
use std::sync::Mutex;
use std::time::Duration;

/// Desktop browser User-Agent strings used when none are configured
pub const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/103.0.5060.134 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:94.0) Gecko/20100101 Firefox/94.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Version/14.0.3 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/92.0.902.67 Safari/537.36 Edg/92.0.902.67",
];

/// Something that can GET a URL
///
/// The crawl engine only talks to this trait, so tests can swap in stubs.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Performs one GET request
    ///
    /// # Returns
    ///
    /// * `Ok(FetchedPage)` - A response was received (any status code)
    /// * `Err(SiftError)` - Transport failure (connection, timeout, body read)
    async fn fetch(&self, url: &str) -> Result<FetchedPage, SiftError>;
}

/// A fixed pool of User-Agent strings with a uniform random pick
///
/// The generator is seeded once when the pool is built.
pub struct UserAgentPool {
    agents: Vec<String>,
    rng: Mutex<StdRng>,
}

impl UserAgentPool {
    /// Creates a pool seeded from OS entropy
    ///
    /// An empty `agents` list falls back to `DEFAULT_USER_AGENTS`.
    pub fn new(agents: Vec<String>) -> Self {
        Self::with_rng(agents, StdRng::from_entropy())
    }

    /// Creates a pool with a fixed seed, for reproducible rotation
    pub fn with_seed(agents: Vec<String>, seed: u64) -> Self {
        Self::with_rng(agents, StdRng::seed_from_u64(seed))
    }

    fn with_rng(agents: Vec<String>, rng: StdRng) -> Self {
        let agents = if agents.is_empty() {
            DEFAULT_USER_AGENTS.iter().map(|s| s.to_string()).collect()
        } else {
            agents
        };

        Self {
            agents,
            rng: Mutex::new(rng),
        }
    }

    /// Picks a User-Agent uniformly at random
    pub fn pick(&self) -> &str {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        self.agents
            .choose(&mut *rng)
            .map(String::as_str)
            .unwrap_or(DEFAULT_USER_AGENTS[0])
    }

    /// All agents in the pool
    pub fn agents(&self) -> &[String] {
        &self.agents
    }
}

impl Default for UserAgentPool {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

/// Builds an HTTP client with the given per-request timeout
///
/// Redirects follow reqwest's default policy. The User-Agent is set per
/// request, not on the client.
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(timeout)
        .gzip(true)
        .brotli(true)
        .build()
}

/// reqwest-backed `Fetcher`
pub struct HttpFetcher {
    client: Client,
    user_agents: UserAgentPool,
}

impl HttpFetcher {
    /// Creates a fetcher with its own client
    ///
    /// # Example
    ///
    /// ```no_run
    /// use std::time::Duration;
    /// use sumi_sift::crawler::{HttpFetcher, UserAgentPool};
    ///
    /// let fetcher = HttpFetcher::new(Duration::from_secs(10), UserAgentPool::default()).unwrap();
    /// ```
    pub fn new(timeout: Duration, user_agents: UserAgentPool) -> Result<Self, SiftError> {
        let client = build_http_client(timeout)?;
        Ok(Self::with_client(client, user_agents))
    }

    /// Creates a fetcher around an existing client
    pub fn with_client(client: Client, user_agents: UserAgentPool) -> Self {
        Self {
            client,
            user_agents,
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, SiftError> {
        let user_agent = self.user_agents.pick();
        tracing::trace!("GET {} (User-Agent: {})", url, user_agent);

        let response = self
            .client
            .get(url)
            .header(USER_AGENT, user_agent)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status_code = response.status().as_u16();
        let final_url = response.url().to_string();

        let body = response.text().await.map_err(|e| classify_error(url, e))?;

        Ok(FetchedPage {
            requested_url: url.to_string(),
            final_url,
            status_code,
            body,
        })
    }
}

/// Maps a reqwest error onto the crate's network error variants
fn classify_error(url: &str, error: reqwest::Error) -> SiftError {
    if error.is_timeout() {
        SiftError::Timeout {
            url: url.to_string(),
        }
    } else {
        SiftError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(Duration::from_secs(10));
        assert!(client.is_ok());
    }

    #[test]
    fn test_empty_pool_uses_defaults() {
        let pool = UserAgentPool::new(Vec::new());
        assert_eq!(pool.agents().len(), DEFAULT_USER_AGENTS.len());
    }

    #[test]
    fn test_pick_stays_in_pool() {
        let pool = UserAgentPool::default();
        for _ in 0..100 {
            let agent = pool.pick();
            assert!(DEFAULT_USER_AGENTS.contains(&agent));
        }
    }

    #[test]
    fn test_pick_rotates() {
        let pool = UserAgentPool::with_seed(Vec::new(), 7);
        let seen: HashSet<String> = (0..200).map(|_| pool.pick().to_string()).collect();
        assert!(seen.len() > 1);
    }

    #[test]
    fn test_seeded_pools_agree() {
        let agents = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let first = UserAgentPool::with_seed(agents.clone(), 42);
        let second = UserAgentPool::with_seed(agents, 42);

        for _ in 0..20 {
            assert_eq!(first.pick(), second.pick());
        }
    }

    #[test]
    fn test_single_agent_pool() {
        let pool = UserAgentPool::new(vec!["OnlyAgent/1.0".to_string()]);
        assert_eq!(pool.pick(), "OnlyAgent/1.0");
    }

    #[tokio::test]
    async fn test_fetch_invalid_url_is_network_error() {
        let fetcher = HttpFetcher::new(Duration::from_secs(1), UserAgentPool::default()).unwrap();
        let result = fetcher.fetch("not a url").await;
        let err = result.unwrap_err();
        assert!(err.is_network());
    }
}
