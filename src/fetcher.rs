//! HTTP fetcher for downloading raw source text.
//!
//! Fetching never fails from the caller's point of view: once every retry
//! is exhausted the source simply yields an empty string.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

#[cfg(test)]
use mockall::automock;

use crate::config::FetchConfig;

/// Maximum size per fetched document (10 MB)
const MAX_DOCUMENT_SIZE: usize = 10 * 1024 * 1024;

/// Maximum total size for all downloads of one run (50 MB)
const MAX_TOTAL_SIZE: usize = 50 * 1024 * 1024;

/// Something that can turn a URL into raw text.
///
/// Implementations must not fail: an unreachable source is an empty string.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TextSource: Send + Sync {
    async fn fetch_text(&self, url: &str) -> String;
}

/// HTTP client with retry and size limits
pub struct Fetcher {
    client: Client,
    max_retries: u32,
    retry_delay: Duration,
    /// Cumulative download size tracker (shared by concurrent fetches)
    total_downloaded: AtomicUsize,
}

impl Fetcher {
    /// Create a new fetcher from the fetch configuration
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(format!("ipharvest/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            max_retries: config.max_retries.max(1),
            retry_delay: Duration::from_millis(config.retry_delay_ms),
            total_downloaded: AtomicUsize::new(0),
        })
    }

    /// Get the total bytes downloaded so far
    pub fn total_downloaded(&self) -> usize {
        self.total_downloaded.load(Ordering::Relaxed)
    }

    /// Fetch content, retrying with a fixed delay between attempts
    pub async fn fetch_with_retry(&self, url: &str) -> Result<String> {
        let mut last_error = None;

        for attempt in 0..self.max_retries {
            if attempt > 0 {
                debug!(
                    "Retry {} after {}ms for {}",
                    attempt,
                    self.retry_delay.as_millis(),
                    url
                );
                tokio::time::sleep(self.retry_delay).await;
            }

            match self.fetch_once(url).await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    debug!("Attempt {} for {} failed: {:#}", attempt + 1, url, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow::anyhow!("Unknown error")))
    }

    /// Single attempt with size validation
    async fn fetch_once(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            anyhow::bail!("HTTP {}", response.status());
        }

        if let Some(content_length) = response.content_length() {
            let content_length = content_length as usize;
            if content_length > MAX_DOCUMENT_SIZE {
                anyhow::bail!(
                    "Response too large: {} bytes (max: {} bytes)",
                    content_length,
                    MAX_DOCUMENT_SIZE
                );
            }
            let current_total = self.total_downloaded();
            if current_total + content_length > MAX_TOTAL_SIZE {
                anyhow::bail!(
                    "Cumulative download limit exceeded: {} + {} > {} bytes",
                    current_total,
                    content_length,
                    MAX_TOTAL_SIZE
                );
            }
        }

        let body = response
            .text()
            .await
            .context("Failed to read response body")?;

        if body.len() > MAX_DOCUMENT_SIZE {
            anyhow::bail!(
                "Downloaded content too large: {} bytes (max: {} bytes)",
                body.len(),
                MAX_DOCUMENT_SIZE
            );
        }

        let new_total = self
            .total_downloaded
            .fetch_add(body.len(), Ordering::Relaxed)
            + body.len();
        if new_total > MAX_TOTAL_SIZE {
            anyhow::bail!(
                "Cumulative download limit exceeded: {} bytes (max: {} bytes)",
                new_total,
                MAX_TOTAL_SIZE
            );
        }

        Ok(body)
    }
}

#[async_trait]
impl TextSource for Fetcher {
    async fn fetch_text(&self, url: &str) -> String {
        match self.fetch_with_retry(url).await {
            Ok(body) => body,
            Err(e) => {
                warn!(
                    "Giving up on {} after {} attempt(s): {:#}",
                    url, self.max_retries, e
                );
                String::new()
            }
        }
    }
}

// Note: Default is intentionally not implemented for Fetcher
// because new() can fail and we want explicit error handling.

/// Split raw text into trimmed, non-blank lines
pub fn split_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
