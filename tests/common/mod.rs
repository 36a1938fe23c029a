//! Common test utilities

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::Instant;

use sitewatch::config::{Config, StoreHandleMode};
use sitewatch::crawler::fetcher::Fetcher;
use sitewatch::error::FetchError;
use sitewatch::notifications::channels::{Channel, ChannelResult, DeliveryStatus};

/// Fetcher serving fixed pages keyed by canonical URL; anything else is a 404
#[derive(Default)]
pub struct StaticFetcher {
    pages: HashMap<String, String>,
    delay: Option<Duration>,
    fetches: AtomicUsize,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, html: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), html.into());
        self
    }

    /// Hold every response for `delay` so concurrent workers overlap
    #[allow(dead_code)]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    #[allow(dead_code)]
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.pages
            .get(url)
            .cloned()
            .ok_or(FetchError::ServerError(404))
    }
}

/// Channel that remembers every message and when it was sent
#[derive(Default)]
pub struct RecordingChannel {
    sent: Mutex<Vec<(String, Instant)>>,
}

impl RecordingChannel {
    pub fn messages(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(m, _)| m.clone())
            .collect()
    }

    #[allow(dead_code)]
    pub fn send_times(&self) -> Vec<Instant> {
        self.sent.lock().unwrap().iter().map(|(_, t)| *t).collect()
    }
}

#[async_trait]
impl Channel for RecordingChannel {
    fn name(&self) -> &str {
        "recording"
    }

    async fn send(&self, message: &str) -> ChannelResult<DeliveryStatus> {
        self.sent
            .lock()
            .unwrap()
            .push((message.to_string(), Instant::now()));
        Ok(DeliveryStatus::success("recording"))
    }
}

/// Configuration pointing at a fresh database inside `dir`
pub fn test_config(dir: &TempDir, seeds: &[&str], workers: usize, mode: StoreHandleMode) -> Config {
    let mut config = Config::default();
    config.crawler.seeds = seeds.iter().map(|s| s.to_string()).collect();
    config.crawler.workers = workers;
    config.database.sqlite_path = dir.path().join("sitewatch.db");
    config.database.handle_mode = mode;
    config
}

/// A page whose only content is the given links
pub fn index_page(links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<li><a href="{href}">{href}</a></li>"#))
        .collect();
    format!("<html><body><ul>{anchors}</ul></body></html>")
}

/// A news article page with a title and no outbound links
pub fn article_page(title: &str) -> String {
    format!(
        r#"<html><body><article><h1 class="title">{title}</h1><p>Launch update for {title}.</p></article></body></html>"#
    )
}
