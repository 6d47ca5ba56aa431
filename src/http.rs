use std::time::Duration;

use anyhow::Context as _;
use url::Url;

/// Bounded exponential backoff for upstream requests.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    /// Backoff before the next attempt, or `None` when attempts are
    /// exhausted. `attempt` is 1-based.
    pub fn backoff(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_attempts {
            return None;
        }
        let exp = 1u32 << attempt.saturating_sub(1).min(8);
        Some(self.base_delay.saturating_mul(exp).min(self.max_delay))
    }
}

pub fn build_client(timeout: Duration) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("coverfetch/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("build http client")
}

/// GET a JSON document, retrying transient failures per `policy`.
pub async fn get_json(
    client: &reqwest::Client,
    policy: &RetryPolicy,
    url: &Url,
) -> anyhow::Result<serde_json::Value> {
    let response = send_with_retry(client, policy, url).await?;

    let status = response.status();
    if !status.is_success() {
        anyhow::bail!("GET {url} returned {status}");
    }

    response
        .json::<serde_json::Value>()
        .await
        .with_context(|| format!("parse json body: {url}"))
}

/// Lightweight existence check. A 404 is a definitive "absent", every other
/// non-success status is an error.
pub async fn probe(
    client: &reqwest::Client,
    policy: &RetryPolicy,
    url: &Url,
) -> anyhow::Result<bool> {
    let response = send_with_retry(client, policy, url).await?;

    let status = response.status();
    if status == reqwest::StatusCode::NOT_FOUND {
        return Ok(false);
    }
    if !status.is_success() {
        anyhow::bail!("GET {url} returned {status}");
    }

    Ok(true)
}

async fn send_with_retry(
    client: &reqwest::Client,
    policy: &RetryPolicy,
    url: &Url,
) -> anyhow::Result<reqwest::Response> {
    let mut attempt = 1u32;
    loop {
        let result = client.get(url.clone()).send().await;

        match result {
            Ok(response) if !is_retryable_status(response.status()) => return Ok(response),
            Ok(response) => {
                let status = response.status();
                match policy.backoff(attempt) {
                    Some(delay) => {
                        tracing::debug!(%url, %status, attempt, ?delay, "retrying throttled request");
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                    }
                    None => anyhow::bail!("GET {url} returned {status} after {attempt} attempts"),
                }
            }
            Err(err) if is_retryable_error(&err) => match policy.backoff(attempt) {
                Some(delay) => {
                    tracing::debug!(%url, %err, attempt, ?delay, "retrying failed request");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                None => {
                    return Err(err).with_context(|| format!("GET {url} after {attempt} attempts"));
                }
            },
            Err(err) => return Err(err).with_context(|| format!("GET {url}")),
        }
    }
}

fn is_retryable_status(status: reqwest::StatusCode) -> bool {
    status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn is_retryable_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect()
}
