//! Crawl worker
//!
//! Each worker loops on the shared [`Frontier`]:
//!
//! 1. fetch the page (failure: log, abandon the URL)
//! 2. parse and classify it; a reportable page is appended to the store and,
//!    if the row is new, a notification is queued
//! 3. enqueue every whitelisted link found on the page, in document order
//! 4. mark the URL done
//!
//! Step 4 runs on every path out of steps 1-3, unwinding included, so the
//! frontier's completion count always balances.

use std::sync::Arc;

use crate::crawler::fetcher::Fetcher;
use crate::crawler::frontier::Frontier;
use crate::crawler::url::LinkClassifier;
use crate::crawler::CrawlStats;
use crate::models::{CanonicalUrl, LinkRecord};
use crate::notifications::{format_message, NotificationQueue};
use crate::parser::Page;
use crate::storage::{AddOutcome, LinkStore};

/// State shared by every worker of one run
#[derive(Clone)]
pub struct WorkerContext {
    pub frontier: Arc<Frontier>,
    pub classifier: Arc<LinkClassifier>,
    pub fetcher: Arc<dyn Fetcher>,
    pub notifications: Arc<NotificationQueue>,
    pub stats: Arc<CrawlStats>,
    pub store_snapshots: bool,
}

/// What one fetched page yields
#[derive(Debug, Default)]
pub struct PageAnalysis {
    /// Present when the URL belongs to a reportable category
    pub record: Option<LinkRecord>,
    /// Whitelisted outbound links, canonical, in document order
    pub links: Vec<CanonicalUrl>,
}

/// Classify a fetched page and collect its outbound links
///
/// Parsing happens entirely inside this call; the DOM is not `Send` and
/// never outlives it.
pub fn analyze_page(
    classifier: &LinkClassifier,
    url: &CanonicalUrl,
    body: &str,
    store_snapshots: bool,
) -> PageAnalysis {
    let page = Page::parse(body);
    let category = classifier.classify(url);

    let record = category.is_reportable().then(|| LinkRecord {
        url: url.clone(),
        category,
        title: category.extract_title(&page).ok(),
        snapshot: if store_snapshots {
            page.text_snapshot()
        } else {
            None
        },
    });

    let links = page
        .find_links()
        .iter()
        .filter_map(|href| classifier.canonicalize(href))
        .filter(|link| classifier.is_whitelisted(link))
        .collect();

    PageAnalysis { record, links }
}

/// Calls [`Frontier::done`] when dropped
struct InFlight(Arc<Frontier>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.done();
    }
}

/// One crawl task with its own store handle
pub struct Worker {
    id: usize,
    ctx: WorkerContext,
    store: Box<dyn LinkStore>,
}

impl Worker {
    pub fn new(id: usize, ctx: WorkerContext, store: Box<dyn LinkStore>) -> Self {
        Self { id, ctx, store }
    }

    /// Process URLs until the frontier reports the run complete
    pub async fn run(mut self) {
        tracing::debug!(worker = self.id, "Worker started");

        let frontier = Arc::clone(&self.ctx.frontier);
        while let Some(url) = frontier.get().await {
            let _in_flight = InFlight(Arc::clone(&frontier));
            self.process(&url).await;
        }

        tracing::debug!(worker = self.id, "Worker finished");
    }

    // `&mut self` keeps the future `Send`: store handles are `Send` but not `Sync`.
    async fn process(&mut self, url: &CanonicalUrl) {
        let body = match self.ctx.fetcher.fetch(url.as_str()).await {
            Ok(body) => body,
            Err(e) => {
                self.ctx.stats.record_fetch_failure();
                tracing::warn!(
                    worker = self.id,
                    url = %url,
                    error = %e,
                    recoverable = e.is_recoverable(),
                    "Failed to fetch page"
                );
                return;
            }
        };
        self.ctx.stats.record_page();

        let analysis = analyze_page(
            &self.ctx.classifier,
            url,
            &body,
            self.ctx.store_snapshots,
        );

        if let Some(record) = analysis.record {
            self.persist(&record);
        }

        let mut enqueued = 0;
        for link in analysis.links {
            if self.ctx.frontier.put(link) {
                enqueued += 1;
            }
        }
        self.ctx.stats.record_links(enqueued);

        tracing::debug!(worker = self.id, url = %url, enqueued, "Page processed");
    }

    fn persist(&mut self, record: &LinkRecord) {
        let noun = record.category.noun();

        match self.store.add(&record.url, record.snapshot.as_deref()) {
            Ok(AddOutcome::Inserted(id)) => {
                self.ctx.stats.record_new();
                tracing::info!(worker = self.id, id, url = %record.url, "New {noun} found");

                let message = format_message(record.category, record.title.as_deref(), &record.url);
                if !self.ctx.notifications.push(message) {
                    tracing::debug!(url = %record.url, "Duplicate notification text dropped");
                }
            }
            Ok(AddOutcome::AlreadyExists) => {
                self.ctx.stats.record_existing();
                tracing::info!(worker = self.id, url = %record.url, "Existing {noun} found");
            }
            Err(e) => {
                self.ctx.stats.record_store_failure();
                tracing::error!(
                    worker = self.id,
                    url = %record.url,
                    error = %e,
                    "Failed to record {noun}"
                );
            }
        }
    }
}
