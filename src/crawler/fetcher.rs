//! HTTP fetcher with optional rate limiting
//!
//! Workers only see the [`Fetcher`] capability; [`HttpFetcher`] is the
//! production implementation over `reqwest`. There is no retry: a failed
//! fetch abandons the URL for this run and the next run will meet it again.

use std::num::NonZeroU32;
use std::time::Duration;

use async_trait::async_trait;
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE},
    Client,
};
use url::Url;

use crate::config::CrawlerConfig;
use crate::utils::error::FetchError;

/// Retrieve the body of a page as text
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch `url`; the implementation owns timeouts
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// `reqwest` based fetcher
pub struct HttpFetcher {
    /// HTTP client with configured timeout, user agent and compression
    client: Client,

    /// Politeness limiter, absent when the crawl is unthrottled
    rate_limiter: Option<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl HttpFetcher {
    /// Create a fetcher from crawler settings
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn new(config: &CrawlerConfig) -> Result<Self, FetchError> {
        Self::with_config(
            &config.user_agent,
            config.request_timeout(),
            config.rate_limit,
        )
    }

    /// Create a fetcher with explicit settings
    ///
    /// # Arguments
    ///
    /// * `user_agent` - Value of the `User-Agent` header
    /// * `timeout` - Whole-request timeout
    /// * `requests_per_second` - Optional request ceiling; `None` or `0` disables it
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn with_config(
        user_agent: &str,
        timeout: Duration,
        requests_per_second: Option<u32>,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .default_headers(Self::default_headers())
            .timeout(timeout)
            .gzip(true)
            .cookie_store(true)
            .build()?;

        let rate_limiter = requests_per_second
            .and_then(NonZeroU32::new)
            .map(|rate| RateLimiter::direct(Quota::per_second(rate)));

        Ok(Self {
            client,
            rate_limiter,
        })
    }

    /// Whether requests are throttled
    pub fn is_rate_limited(&self) -> bool {
        self.rate_limiter.is_some()
    }

    fn default_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let url = Url::parse(url).map_err(|_| FetchError::InvalidUrl(url.to_string()))?;

        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Http(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::ServerError(status.as_u16()));
        }

        response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Http(e)
            }
        })
    }
}
