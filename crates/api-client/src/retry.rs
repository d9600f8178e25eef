use std::time::Duration;

use anyhow::{Context, Result};
use tracing::warn;

/// Configuration for retry behaviour on idempotent GET requests.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: usize,
    /// Backoff before each retry, in milliseconds.
    pub delays_ms: Vec<u64>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delays_ms: vec![250, 500, 1000],
        }
    }
}

impl RetryConfig {
    /// Single attempt, no backoff.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            delays_ms: Vec::new(),
        }
    }

    fn delay(&self, attempt: usize) -> Option<Duration> {
        if attempt >= self.max_retries {
            return None;
        }
        self.delays_ms.get(attempt).copied().map(Duration::from_millis)
    }
}

/// Retry an HTTP GET with backoff.
///
/// Retries on network errors and 5xx responses.
/// Returns immediately on success or 4xx.
pub async fn retry_get(
    client: &reqwest::Client,
    url: &str,
    auth_token: Option<&str>,
    config: &RetryConfig,
) -> Result<reqwest::Response> {
    let max_attempts = config.max_retries + 1;
    let mut attempt = 0;

    loop {
        let mut req = client.get(url);
        if let Some(token) = auth_token {
            req = req.bearer_auth(token);
        }

        match req.send().await {
            Ok(resp) if resp.status().is_server_error() => {
                let Some(delay) = config.delay(attempt) else {
                    return Ok(resp);
                };
                warn!(
                    "GET {url} attempt {}/{} failed (HTTP {}), retrying in {}ms",
                    attempt + 1,
                    max_attempts,
                    resp.status(),
                    delay.as_millis(),
                );
                tokio::time::sleep(delay).await;
            }
            Ok(resp) => return Ok(resp),
            Err(e) => {
                let Some(delay) = config.delay(attempt) else {
                    return Err(e).context("Failed to connect after retries");
                };
                warn!(
                    "GET {url} attempt {}/{} failed ({}), retrying in {}ms",
                    attempt + 1,
                    max_attempts,
                    e,
                    delay.as_millis(),
                );
                tokio::time::sleep(delay).await;
            }
        }
        attempt += 1;
    }
}
