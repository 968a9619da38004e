//! Page fetching with exponential backoff retry logic.
//!
//! Google News occasionally answers with 429s or drops connections, so every
//! search page goes through a retrying fetcher.
//!
//! # Architecture
//!
//! - [`FetchAsync`]: core trait for "URL in, body out"
//! - [`HttpFetcher`]: `reqwest` implementation with timeout and user agent
//! - [`RetryFetch`]: decorator adding retries to any `FetchAsync`
//!
//! # Retry Strategy
//!
//! ```text
//! delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
//! ```

use crate::config::SearchConfig;
use rand::{Rng, rng};
use reqwest::Client;
use std::error::Error;
use std::fmt;
use std::time::{Duration as StdDuration, Instant};
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};

/// Trait for async page retrieval.
pub trait FetchAsync {
    /// The type of response returned.
    type Response;

    /// Fetch `url`, returning the body or an error.
    async fn fetch(&self, url: &str) -> Result<Self::Response, Box<dyn Error>>;
}

/// Wrapper that adds exponential backoff retry logic to any [`FetchAsync`] implementation.
pub struct RetryFetch<T> {
    /// The underlying fetcher.
    inner: T,
    /// Retries after the first attempt; `max_retries + 1` requests at most.
    max_retries: usize,
    /// Initial delay between retries (doubles with each attempt).
    base_delay: StdDuration,
    /// Cap on a single delay.
    max_delay: StdDuration,
}

impl<T> RetryFetch<T>
where
    T: FetchAsync,
{
    /// Wrap `inner`, retrying up to `max_retries` times starting at `base_delay`.
    pub fn new(inner: T, max_retries: usize, base_delay: StdDuration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: StdDuration::from_secs(30),
        }
    }
}

impl<T> fmt::Debug for RetryFetch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryFetch")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T> FetchAsync for RetryFetch<T>
where
    T: FetchAsync + fmt::Debug,
{
    type Response = T::Response;

    #[instrument(level = "info", skip_all, fields(%url))]
    async fn fetch(&self, url: &str) -> Result<Self::Response, Box<dyn Error>> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            let attempt_t0 = Instant::now();
            match self.inner.fetch(url).await {
                Ok(resp) => {
                    return Ok(resp);
                }
                Err(e) => {
                    attempt += 1;
                    let attempt_dt = attempt_t0.elapsed();
                    let total_dt = total_t0.elapsed();

                    if attempt > self.max_retries {
                        error!(
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_attempt = attempt_dt.as_millis() as u128,
                            elapsed_ms_total = total_dt.as_millis() as u128,
                            error = %e,
                            "fetch() exhausted retries"
                        );
                        return Err(e);
                    }

                    // backoff calc
                    let shift = (attempt - 1).min(16) as u32;
                    let mut delay = self.base_delay.saturating_mul(1 << shift);
                    if delay > self.max_delay {
                        delay = self.max_delay;
                    }
                    let jitter_ms: u64 = rng().random_range(0..=250);
                    let delay = delay + StdDuration::from_millis(jitter_ms);

                    warn!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_attempt = attempt_dt.as_millis() as u128,
                        elapsed_ms_total = total_dt.as_millis() as u128,
                        ?delay,
                        error = %e,
                        "fetch() attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

/// Plain HTTP GET returning the response body as text.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(search: &SearchConfig) -> Result<Self, Box<dyn Error>> {
        let client = Client::builder()
            .timeout(StdDuration::from_secs(search.timeout_secs))
            .user_agent(search.user_agent.as_str())
            .build()?;
        Ok(Self { client })
    }
}

impl FetchAsync for HttpFetcher {
    type Response = String;

    #[instrument(level = "debug", skip_all)]
    async fn fetch(&self, url: &str) -> Result<Self::Response, Box<dyn Error>> {
        let t0 = Instant::now();
        let res = async {
            let resp = self.client.get(url).send().await?.error_for_status()?;
            Ok::<_, reqwest::Error>(resp.text().await?)
        }
        .await;
        let dt = t0.elapsed();

        match res {
            Ok(body) => {
                info!(elapsed_ms = dt.as_millis() as u128, bytes = body.len(), "Fetched page");
                Ok(body)
            }
            Err(e) => {
                warn!(elapsed_ms = dt.as_millis() as u128, error = %e, "HTTP request failed");
                Err(Box::new(e))
            }
        }
    }
}

/// Fetch `url` through a [`RetryFetch`] around `fetcher`.
#[instrument(level = "info", skip(fetcher))]
pub async fn fetch_with_backoff<F>(
    fetcher: &F,
    url: &str,
    max_retries: usize,
) -> Result<F::Response, Box<dyn Error>>
where
    F: FetchAsync + fmt::Debug,
{
    let t0 = Instant::now();
    let api = RetryFetch::new(ByRef(fetcher), max_retries, StdDuration::from_secs(1));
    let res = api.fetch(url).await;
    let dt = t0.elapsed();

    match &res {
        Ok(_) => info!(
            elapsed_ms_total = dt.as_millis() as u128,
            "fetch_with_backoff succeeded"
        ),
        Err(e) => {
            error!(elapsed_ms_total = dt.as_millis() as u128, error = %e, "fetch_with_backoff failed")
        }
    }
    res
}

/// Lets a borrowed fetcher be wrapped without cloning it.
#[derive(Debug)]
struct ByRef<'a, F>(&'a F);

impl<F: FetchAsync> FetchAsync for ByRef<'_, F> {
    type Response = F::Response;

    async fn fetch(&self, url: &str) -> Result<Self::Response, Box<dyn Error>> {
        self.0.fetch(url).await
    }
}
