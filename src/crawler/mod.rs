//! Concurrent crawl of the watched site
//!
//! A [`Crawler`] seeds the [`Frontier`], runs a fixed pool of
//! [`Worker`](worker::Worker)s until the frontier drains, and reports what
//! happened. Publishing the queued notifications is a separate step that the
//! caller runs afterwards with [`CrawlReport::was_cold_start`].

pub mod fetcher;
pub mod frontier;
pub mod url;
pub mod worker;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;

use crate::config::Config;
use crate::error::Result;
use crate::models::CanonicalUrl;
use crate::notifications::NotificationQueue;
use crate::storage::StoreProvider;

use self::fetcher::{Fetcher, HttpFetcher};
use self::frontier::Frontier;
use self::url::LinkClassifier;
use self::worker::{Worker, WorkerContext};

/// Run counters shared by every worker
#[derive(Debug, Default)]
pub struct CrawlStats {
    pub pages_fetched: AtomicU64,
    pub fetch_failures: AtomicU64,
    pub new_records: AtomicU64,
    pub existing_records: AtomicU64,
    pub store_failures: AtomicU64,
    pub links_enqueued: AtomicU64,
}

impl CrawlStats {
    /// Create new stats counter
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn record_page(&self) {
        self.pages_fetched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fetch_failure(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_new(&self) {
        self.new_records.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_existing(&self) {
        self.existing_records.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_store_failure(&self) {
        self.store_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_links(&self, count: u64) {
        self.links_enqueued.fetch_add(count, Ordering::Relaxed);
    }

    /// Get snapshot of current stats
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            pages_fetched: self.pages_fetched.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            new_records: self.new_records.load(Ordering::Relaxed),
            existing_records: self.existing_records.load(Ordering::Relaxed),
            store_failures: self.store_failures.load(Ordering::Relaxed),
            links_enqueued: self.links_enqueued.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of crawl statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub pages_fetched: u64,
    pub fetch_failures: u64,
    pub new_records: u64,
    pub existing_records: u64,
    pub store_failures: u64,
    pub links_enqueued: u64,
}

/// Summary of one crawl
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    pub stats: StatsSnapshot,
    /// The store held no records when the run began
    pub was_cold_start: bool,
    /// Distinct URLs accepted by the frontier
    pub urls_seen: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CrawlReport {
    /// Whether queued notifications should go out after this run
    pub fn should_publish(&self) -> bool {
        !self.was_cold_start
    }
}

/// Crawl orchestrator
pub struct Crawler {
    config: Config,
    classifier: Arc<LinkClassifier>,
    fetcher: Arc<dyn Fetcher>,
}

impl Crawler {
    /// Create a crawler over an explicit fetch capability
    ///
    /// # Errors
    ///
    /// Returns `Error::Parse` when the configured site is not a valid root URL
    pub fn new(config: Config, fetcher: Arc<dyn Fetcher>) -> Result<Self> {
        let classifier = Arc::new(LinkClassifier::new(&config.site)?);
        Ok(Self {
            config,
            classifier,
            fetcher,
        })
    }

    /// Create a crawler that fetches over HTTP
    pub fn with_http(config: Config) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config.crawler)?;
        Self::new(config, Arc::new(fetcher))
    }

    pub fn classifier(&self) -> &LinkClassifier {
        &self.classifier
    }

    /// Canonical seed URLs; blank entries are skipped
    pub fn seeds(&self) -> Vec<CanonicalUrl> {
        self.config
            .crawler
            .seeds
            .iter()
            .filter_map(|seed| self.classifier.canonicalize(seed))
            .collect()
    }

    /// Crawl until no URL is queued or in flight
    ///
    /// Notifications for new records are pushed to `notifications`; nothing is
    /// sent from here.
    ///
    /// # Errors
    ///
    /// Fails only if the store cannot be read before the run or a worker's
    /// store handle cannot be opened. Per-page failures are logged and counted.
    pub async fn crawl(
        &self,
        provider: &StoreProvider,
        notifications: Arc<NotificationQueue>,
    ) -> Result<CrawlReport> {
        let started_at = Utc::now();

        // Heuristic: a store emptied mid-history would look like a first run.
        let existing = provider.handle()?.count(None)?;
        let was_cold_start = existing == 0;
        tracing::info!(
            started_at = %started_at.to_rfc3339(),
            existing_records = existing,
            should_publish = !was_cold_start,
            "Should publish during this run? {}",
            if was_cold_start { "no (cold start)" } else { "yes" }
        );

        let frontier = Arc::new(Frontier::new());
        for seed in self.seeds() {
            frontier.put(seed);
        }

        let stats = CrawlStats::new();
        let ctx = WorkerContext {
            frontier: Arc::clone(&frontier),
            classifier: Arc::clone(&self.classifier),
            fetcher: Arc::clone(&self.fetcher),
            notifications,
            stats: Arc::clone(&stats),
            store_snapshots: self.config.crawler.store_snapshots,
        };

        // Open every handle before spawning so a failure leaves nothing running
        let workers = (0..self.config.crawler.workers.max(1))
            .map(|id| -> Result<Worker> { Ok(Worker::new(id, ctx.clone(), provider.handle()?)) })
            .collect::<Result<Vec<_>>>()?;
        let workers_count = workers.len();
        let handles: Vec<_> = workers
            .into_iter()
            .map(|worker| tokio::spawn(worker.run()))
            .collect();

        tracing::info!(
            workers = workers_count,
            seeds = frontier.pending(),
            store_mode = provider.mode().as_str(),
            "Crawl started"
        );

        frontier.drained().await;

        for result in join_all(handles).await {
            if let Err(e) = result {
                tracing::error!(error = %e, "Worker task failed");
            }
        }

        let report = CrawlReport {
            stats: stats.snapshot(),
            was_cold_start,
            urls_seen: frontier.seen_count(),
            started_at,
            finished_at: Utc::now(),
        };

        tracing::info!(
            pages = report.stats.pages_fetched,
            fetch_failures = report.stats.fetch_failures,
            new = report.stats.new_records,
            existing = report.stats.existing_records,
            store_failures = report.stats.store_failures,
            urls_seen = report.urls_seen,
            elapsed_ms = (report.finished_at - started_at).num_milliseconds(),
            "Crawl completed"
        );

        Ok(report)
    }
}
