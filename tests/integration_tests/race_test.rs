//! Concurrent discovery of one URL yields one record and one notification

use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use sitewatch::config::StoreHandleMode;
use sitewatch::crawler::Crawler;
use sitewatch::notifications::NotificationQueue;
use sitewatch::storage::StoreProvider;

use crate::common::{article_page, index_page, test_config, StaticFetcher};

const SHARED_JOB: &str = "https://spacex.com/careers/position/8080";

/// Eight index pages that all link to the same job posting
fn fan_in_site() -> (Vec<String>, StaticFetcher) {
    let mut fetcher = StaticFetcher::new().page(
        SHARED_JOB,
        r#"<html><body><h2 class="position-title">Launch Engineer</h2></body></html>"#,
    );
    let mut seeds = Vec::new();
    for i in 0..8 {
        let index = format!("https://spacex.com/careers/team-{i}");
        fetcher = fetcher.page(
            &index,
            index_page(&["/careers/position/8080/", "http://www.spacex.com/careers/position/8080"]),
        );
        seeds.push(index);
    }
    (seeds, fetcher.with_delay(Duration::from_millis(5)))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_many_workers_one_record() {
    for mode in [StoreHandleMode::PerWorker, StoreHandleMode::Shared] {
        let dir = TempDir::new().unwrap();
        let (seeds, fetcher) = fan_in_site();
        let seeds: Vec<&str> = seeds.iter().map(String::as_str).collect();
        let config = test_config(&dir, &seeds, 6, mode);
        let provider = StoreProvider::open(&config.database).unwrap();
        let fetcher = Arc::new(fetcher);
        let crawler = Crawler::new(config, fetcher.clone()).unwrap();
        let queue = Arc::new(NotificationQueue::new());

        let report = crawler.crawl(&provider, Arc::clone(&queue)).await.unwrap();

        assert_eq!(provider.handle().unwrap().count(None).unwrap(), 1);
        assert_eq!(queue.len(), 1);
        assert_eq!(report.stats.new_records, 1);
        // The frontier hands the shared job to exactly one worker
        assert_eq!(fetcher.fetch_count(), 9);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_runs_record_once() {
    for mode in [StoreHandleMode::PerWorker, StoreHandleMode::Shared] {
        let dir = TempDir::new().unwrap();
        let (seeds, fetcher) = fan_in_site();
        let seeds: Vec<&str> = seeds.iter().map(String::as_str).collect();
        let config = test_config(&dir, &seeds, 4, mode);
        let provider = StoreProvider::open(&config.database).unwrap();
        let fetcher = Arc::new(fetcher);

        // Two runs with separate frontiers race on the same store
        let first = Crawler::new(config.clone(), fetcher.clone()).unwrap();
        let second = Crawler::new(config, fetcher.clone()).unwrap();
        let first_queue = Arc::new(NotificationQueue::new());
        let second_queue = Arc::new(NotificationQueue::new());

        let (a, b) = tokio::join!(
            first.crawl(&provider, Arc::clone(&first_queue)),
            second.crawl(&provider, Arc::clone(&second_queue)),
        );
        let (a, b) = (a.unwrap(), b.unwrap());

        assert_eq!(provider.handle().unwrap().count(None).unwrap(), 1);
        assert_eq!(a.stats.new_records + b.stats.new_records, 1);
        assert_eq!(a.stats.existing_records + b.stats.existing_records, 1);
        assert_eq!(first_queue.len() + second_queue.len(), 1);
    }
}

#[tokio::test]
async fn test_duplicate_links_on_one_page() {
    let dir = TempDir::new().unwrap();
    let article = "https://spacex.com/news/2023/04/20/starship-flight-test";
    let fetcher = StaticFetcher::new()
        .page(
            "https://spacex.com",
            index_page(&[
                "/news/2023/04/20/starship-flight-test",
                "/news/2023/04/20/starship-flight-test#video",
                "/news/2023/04/20/starship-flight-test?utm_source=x",
                "//www.spacex.com/news/2023/04/20/starship-flight-test/",
            ]),
        )
        .page(article, article_page("Starship Flight Test"));
    let config = test_config(&dir, &["https://www.spacex.com"], 2, StoreHandleMode::PerWorker);
    let provider = StoreProvider::open(&config.database).unwrap();
    let fetcher = Arc::new(fetcher);
    let crawler = Crawler::new(config, fetcher.clone()).unwrap();
    let queue = Arc::new(NotificationQueue::new());

    let report = crawler.crawl(&provider, Arc::clone(&queue)).await.unwrap();

    assert_eq!(report.urls_seen, 2);
    assert_eq!(fetcher.fetch_count(), 2);
    assert_eq!(queue.len(), 1);
}
