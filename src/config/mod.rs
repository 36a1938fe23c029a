//! Configuration management for the sitewatch crawler
//!
//! This module handles loading and validating configuration from environment
//! variables and TOML files. A [`Config`] value is built once at startup and
//! handed to the crawler explicitly; nothing reads configuration from globals.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Crawler configuration
    pub crawler: CrawlerConfig,

    /// Target site configuration
    pub site: SiteConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Notification publisher configuration
    pub publisher: PublisherConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Crawler-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Number of concurrent worker tasks
    pub workers: usize,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,

    /// User agent string
    pub user_agent: String,

    /// Optional politeness limit (requests per second across all workers)
    pub rate_limit: Option<u32>,

    /// Absolute URLs loaded into the frontier at startup
    pub seeds: Vec<String>,

    /// Store a plain-text snapshot of each newly discovered page
    pub store_snapshots: bool,
}

/// The fixed site being watched
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Bare host, without scheme or `www.`
    pub host: String,

    /// Scheme re-attached to every canonical URL
    pub scheme: String,

    /// Links containing any of these substrings are never followed
    pub exclusions: Vec<String>,
}

/// How workers obtain a handle to the link store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreHandleMode {
    /// Every worker opens its own connection; SQLite serializes the writers
    #[default]
    PerWorker,
    /// All workers share one connection behind a mutex
    Shared,
}

impl StoreHandleMode {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PerWorker => "per_worker",
            Self::Shared => "shared",
        }
    }
}

impl std::str::FromStr for StoreHandleMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "per_worker" | "per-worker" => Ok(Self::PerWorker),
            "shared" => Ok(Self::Shared),
            _ => anyhow::bail!("Unknown store handle mode: {s}. Valid: per_worker, shared"),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite database path
    pub sqlite_path: PathBuf,

    /// Store handle strategy for the worker pool
    pub handle_mode: StoreHandleMode,

    /// How long a writer waits on a locked database, in milliseconds
    pub busy_timeout_ms: u64,
}

/// Notification publisher configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PublisherConfig {
    /// Minimum gap between two outbound messages, in milliseconds
    pub interval_ms: u64,

    /// Webhook endpoint; messages are only logged when unset
    pub webhook_url: Option<String>,

    /// Optional bearer token for the webhook
    pub auth_token: Option<String>,

    /// Log messages instead of sending them
    pub dry_run: bool,

    /// Webhook request timeout in seconds
    pub timeout_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,

    /// Append log output to this file instead of stderr
    pub file: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables layered over the defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Override fields from `SITEWATCH_*` environment variables
    pub fn apply_env(&mut self) -> Result<()> {
        if let Some(workers) = env_parse::<usize>("SITEWATCH_WORKERS")? {
            self.crawler.workers = workers;
        }

        if let Some(timeout) = env_parse::<u64>("SITEWATCH_REQUEST_TIMEOUT")? {
            self.crawler.request_timeout_secs = timeout;
        }

        if let Some(rate) = env_parse::<u32>("SITEWATCH_RATE_LIMIT")? {
            self.crawler.rate_limit = Some(rate);
        }

        if let Ok(user_agent) = std::env::var("SITEWATCH_USER_AGENT") {
            self.crawler.user_agent = user_agent;
        }

        if let Ok(seeds) = std::env::var("SITEWATCH_SEEDS") {
            self.crawler.seeds = seeds
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }

        if let Ok(path) = std::env::var("SITEWATCH_SQLITE_PATH") {
            self.database.sqlite_path = PathBuf::from(path);
        }

        if let Ok(mode) = std::env::var("SITEWATCH_STORE_MODE") {
            self.database.handle_mode = mode.parse()?;
        }

        if let Ok(url) = std::env::var("SITEWATCH_WEBHOOK_URL") {
            self.publisher.webhook_url = Some(url);
        }

        if let Ok(token) = std::env::var("SITEWATCH_WEBHOOK_TOKEN") {
            self.publisher.auth_token = Some(token);
        }

        if let Some(interval) = env_parse::<u64>("SITEWATCH_PUBLISH_INTERVAL_MS")? {
            self.publisher.interval_ms = interval;
        }

        if let Ok(level) = std::env::var("SITEWATCH_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Ok(format) = std::env::var("SITEWATCH_LOG_FORMAT") {
            self.logging.format = format;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.crawler.workers == 0 {
            anyhow::bail!("workers must be greater than 0");
        }

        if self.crawler.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than 0");
        }

        if self.crawler.rate_limit == Some(0) {
            anyhow::bail!("rate_limit must be positive when set");
        }

        if self.crawler.seeds.is_empty() {
            anyhow::bail!("at least one seed URL is required");
        }

        for seed in &self.crawler.seeds {
            url::Url::parse(seed).with_context(|| format!("Invalid seed URL: {seed}"))?;
        }

        if self.site.host.is_empty() || self.site.host.contains('/') {
            anyhow::bail!("site.host must be a bare host name");
        }

        if self.site.scheme != "http" && self.site.scheme != "https" {
            anyhow::bail!("site.scheme must be http or https");
        }

        if self.publisher.interval_ms == 0 {
            anyhow::bail!("publisher.interval_ms must be greater than 0");
        }

        if let Some(webhook) = &self.publisher.webhook_url {
            url::Url::parse(webhook).with_context(|| format!("Invalid webhook URL: {webhook}"))?;
        }

        Ok(())
    }
}

impl CrawlerConfig {
    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl PublisherConfig {
    /// Get the gap between outbound messages as Duration
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("Invalid value for {key}: {value}")),
        Err(_) => Ok(None),
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            workers: 5,
            request_timeout_secs: 30,
            user_agent: format!("sitewatch/{}", env!("CARGO_PKG_VERSION")),
            rate_limit: None,
            seeds: vec![String::from("https://www.spacex.com")],
            store_snapshots: true,
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            host: String::from("spacex.com"),
            scheme: String::from("https"),
            exclusions: vec![String::from("download"), String::from("category")],
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            sqlite_path: PathBuf::from("data/sitewatch.db"),
            handle_mode: StoreHandleMode::PerWorker,
            busy_timeout_ms: 5000,
        }
    }
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            webhook_url: None,
            auth_token: None,
            dry_run: false,
            timeout_secs: 10,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
            file: None,
        }
    }
}
