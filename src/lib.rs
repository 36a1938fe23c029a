//! sitewatch - new-content watcher for a single website
//!
//! Crawls one fixed site, records every job posting, news article, press
//! release and media item it has never seen before, and announces the new ones
//! through a rate-limited notification channel.
//!
//! # Architecture
//!
//! - [`config`] - Configuration management and settings
//! - [`crawler`] - Frontier, workers and URL classification
//! - [`parser`] - HTML parsing and data extraction
//! - [`models`] - Core data structures and types
//! - [`storage`] - SQLite link store
//! - [`notifications`] - Notification queue, publisher and channels
//! - [`utils`] - Common utilities and helpers
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use sitewatch::config::Config;
//! use sitewatch::crawler::Crawler;
//! use sitewatch::notifications::{NotificationQueue, Publisher};
//! use sitewatch::storage::StoreProvider;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let provider = StoreProvider::open(&config.database)?;
//!     let publisher = Publisher::from_config(&config.publisher)?;
//!     let crawler = Crawler::with_http(config)?;
//!
//!     let queue = Arc::new(NotificationQueue::new());
//!     let report = crawler.crawl(&provider, Arc::clone(&queue)).await?;
//!     publisher.publish(&queue, report.was_cold_start).await;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod crawler;
pub mod error;
pub mod models;
pub mod notifications;
pub mod parser;
pub mod storage;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{Config, StoreHandleMode};
    pub use crate::crawler::fetcher::{Fetcher, HttpFetcher};
    pub use crate::crawler::url::LinkClassifier;
    pub use crate::crawler::{CrawlReport, Crawler};
    pub use crate::error::{Error, ErrorCategory, Result, SitewatchErrorTrait};
    pub use crate::models::{CanonicalUrl, Category, LinkRecord, StoreRecord};
    pub use crate::notifications::{NotificationQueue, PublishReport, Publisher};
    pub use crate::storage::{AddOutcome, LinkStore, StoreProvider};
}

pub use models::{CanonicalUrl, Category};
