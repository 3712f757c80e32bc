//! Page fetching with bounded retry on server-side failures.
//!
//! The module uses a small trait-based design:
//! - [`FetchPage`]: core trait, one URL in, page body out
//! - [`HttpFetcher`]: a single GET through `reqwest` with the configured
//!   user agent and per-request timeout
//! - [`RetryFetch`]: decorator that retries transient failures
//!
//! # Retry Strategy
//!
//! Only [`ScrapeError::TransientFetch`] is retried: a 5xx response or an
//! attempt that hit the request timeout. With `max_retries = R` a page that
//! keeps failing this way is requested exactly `R + 1` times. Client errors
//! (4xx) and other transport failures are returned after the first attempt.

use crate::config::FetchConfig;
use crate::error::ScrapeError;
use rand::{Rng, rng};
use std::fmt;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};

/// Something that can turn a URL into page content.
pub trait FetchPage {
    /// Fetch `url` and return the body as text.
    ///
    /// # Errors
    ///
    /// [`ScrapeError::TransientFetch`] for failures worth another attempt,
    /// [`ScrapeError::PermanentFetch`] for everything else.
    async fn fetch(&self, url: &str) -> Result<String, ScrapeError>;
}

/// One-shot HTTP GET.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build the underlying `reqwest` client.
    ///
    /// # Errors
    ///
    /// [`ScrapeError::Config`] if the client cannot be built (for example a
    /// user agent that is not a valid header value).
    pub fn new(config: &FetchConfig) -> Result<Self, ScrapeError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()
            .map_err(|e| ScrapeError::Config(format!("cannot build http client: {e}")))?;
        Ok(Self { client })
    }
}

impl FetchPage for HttpFetcher {
    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn fetch(&self, url: &str) -> Result<String, ScrapeError> {
        info!(%url, "Fetching page");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_transport_error(url, &e))?;

        let status = response.status();
        if status.is_server_error() {
            return Err(ScrapeError::TransientFetch {
                url: url.to_string(),
                status: Some(status.as_u16()),
                attempts: 1,
                reason: status.to_string(),
            });
        }
        if !status.is_success() {
            return Err(ScrapeError::PermanentFetch {
                url: url.to_string(),
                status: Some(status.as_u16()),
                reason: status.to_string(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| classify_transport_error(url, &e))?;
        debug!(bytes = body.len(), "Fetched page body");
        Ok(body)
    }
}

/// Timeouts share the 5xx retry policy; anything else on the transport is final.
fn classify_transport_error(url: &str, e: &reqwest::Error) -> ScrapeError {
    if e.is_timeout() {
        ScrapeError::TransientFetch {
            url: url.to_string(),
            status: None,
            attempts: 1,
            reason: format!("timed out: {e}"),
        }
    } else {
        ScrapeError::PermanentFetch {
            url: url.to_string(),
            status: e.status().map(|s| s.as_u16()),
            reason: e.to_string(),
        }
    }
}

/// Wrapper that retries transient failures of any [`FetchPage`].
///
/// The delay between attempts is `retry_delay` plus up to 250ms of jitter.
/// A zero `retry_delay` disables waiting entirely.
pub struct RetryFetch<T> {
    inner: T,
    max_retries: usize,
    retry_delay: Duration,
}

impl<T> RetryFetch<T>
where
    T: FetchPage,
{
    /// Wrap `inner`.
    ///
    /// # Arguments
    ///
    /// * `inner` - The fetcher doing the actual work
    /// * `max_retries` - Extra attempts after the first; `0` disables retry
    /// * `retry_delay` - Base wait before each retry
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use health_faq_scraper::config::FetchConfig;
    /// use health_faq_scraper::fetch::{HttpFetcher, RetryFetch};
    /// use std::time::Duration;
    ///
    /// let http = HttpFetcher::new(&FetchConfig::default())?;
    /// let fetcher = RetryFetch::new(http, 3, Duration::from_millis(500));
    /// # Ok::<(), health_faq_scraper::error::ScrapeError>(())
    /// ```
    pub fn new(inner: T, max_retries: usize, retry_delay: Duration) -> Self {
        Self {
            inner,
            max_retries,
            retry_delay,
        }
    }

    fn backoff(&self) -> Duration {
        if self.retry_delay.is_zero() {
            return Duration::ZERO;
        }
        let jitter_ms: u64 = rng().random_range(0..=250);
        self.retry_delay + Duration::from_millis(jitter_ms)
    }
}

impl<T> fmt::Debug for RetryFetch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryFetch")
            .field("max_retries", &self.max_retries)
            .field("retry_delay", &self.retry_delay)
            .finish()
    }
}

impl<T> FetchPage for RetryFetch<T>
where
    T: FetchPage,
{
    #[instrument(level = "info", skip_all, fields(%url))]
    async fn fetch(&self, url: &str) -> Result<String, ScrapeError> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            attempt += 1;
            match self.inner.fetch(url).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_transient() && attempt <= self.max_retries => {
                    let delay = self.backoff();
                    warn!(
                        attempt,
                        max_retries = self.max_retries,
                        ?delay,
                        error = %e,
                        "Transient fetch failure; retrying"
                    );
                    if !delay.is_zero() {
                        sleep(delay).await;
                    }
                }
                Err(ScrapeError::TransientFetch {
                    url, status, reason, ..
                }) => {
                    error!(
                        attempts = attempt,
                        elapsed_ms_total = total_t0.elapsed().as_millis(),
                        %reason,
                        "Fetch exhausted retries"
                    );
                    return Err(ScrapeError::TransientFetch {
                        url,
                        status,
                        attempts: attempt,
                        reason,
                    });
                }
                Err(e) => {
                    error!(error = %e, "Fetch failed");
                    return Err(e);
                }
            }
        }
    }
}

/// The production fetcher: HTTP with retry.
pub type Fetcher = RetryFetch<HttpFetcher>;

/// Build the production fetcher from its settings.
///
/// # Returns
///
/// An [`HttpFetcher`] sending `config.user_agent` with `config.timeout`,
/// wrapped in a [`RetryFetch`] allowing `config.max_retries` extra attempts.
///
/// # Errors
///
/// See [`HttpFetcher::new`].
pub fn build_fetcher(config: &FetchConfig) -> Result<Fetcher, ScrapeError> {
    let http = HttpFetcher::new(config)?;
    Ok(RetryFetch::new(http, config.max_retries, config.retry_delay))
}
