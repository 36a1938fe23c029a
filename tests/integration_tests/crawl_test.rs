//! Complete crawl → classify → store tests against a mocked site

use std::sync::Arc;
use tempfile::TempDir;

use sitewatch::config::StoreHandleMode;
use sitewatch::crawler::Crawler;
use sitewatch::notifications::NotificationQueue;
use sitewatch::storage::StoreProvider;

use crate::common::{article_page, index_page, test_config, StaticFetcher};

const NEWS_INDEX: &str = "https://spacex.com/news";
const ARTICLE_A: &str = "https://spacex.com/news/2024/03/14/starship-flight-3";
const ARTICLE_B: &str = "https://spacex.com/news/2024/06/06/starship-flight-4";
const UNRELATED: &str = "https://spacex.com/vehicles/starship";

fn news_site() -> StaticFetcher {
    StaticFetcher::new()
        .page(
            NEWS_INDEX,
            index_page(&[
                "/news/2024/03/14/starship-flight-3",
                "https://www.spacex.com/news/2024/06/06/starship-flight-4/",
                "/vehicles/starship",
            ]),
        )
        .page(ARTICLE_A, article_page("Starship Flight 3"))
        .page(ARTICLE_B, article_page("Starship Flight 4"))
        .page(UNRELATED, "<html><body><p>Vehicle overview</p></body></html>")
}

#[tokio::test]
async fn test_news_index_end_to_end() {
    for mode in [StoreHandleMode::PerWorker, StoreHandleMode::Shared] {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir, &[NEWS_INDEX], 1, mode);
        let provider = StoreProvider::open(&config.database).unwrap();
        let crawler = Crawler::new(config, Arc::new(news_site())).unwrap();
        let queue = Arc::new(NotificationQueue::new());

        let report = crawler.crawl(&provider, Arc::clone(&queue)).await.unwrap();

        let store = provider.handle().unwrap();
        let classifier = crawler.classifier();
        assert_eq!(store.count(None).unwrap(), 2, "mode {}", mode.as_str());
        assert_eq!(
            store
                .count(Some(&classifier.canonicalize(UNRELATED).unwrap()))
                .unwrap(),
            0
        );
        assert_eq!(
            store
                .count(Some(&classifier.canonicalize(NEWS_INDEX).unwrap()))
                .unwrap(),
            0
        );

        assert_eq!(
            queue.drain(),
            vec![
                format!("New article: Starship Flight 3 {ARTICLE_A}"),
                format!("New article: Starship Flight 4 {ARTICLE_B}"),
            ]
        );

        assert!(report.was_cold_start);
        assert_eq!(report.urls_seen, 4);
        assert_eq!(report.stats.pages_fetched, 4);
        assert_eq!(report.stats.new_records, 2);
        assert_eq!(report.stats.fetch_failures, 0);
    }
}

#[tokio::test]
async fn test_second_run_finds_nothing_new() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir, &[NEWS_INDEX], 2, StoreHandleMode::PerWorker);
    let provider = StoreProvider::open(&config.database).unwrap();
    let crawler = Crawler::new(config, Arc::new(news_site())).unwrap();

    let first = crawler
        .crawl(&provider, Arc::new(NotificationQueue::new()))
        .await
        .unwrap();
    assert_eq!(first.stats.new_records, 2);

    let queue = Arc::new(NotificationQueue::new());
    let second = crawler.crawl(&provider, Arc::clone(&queue)).await.unwrap();

    assert!(!second.was_cold_start);
    assert_eq!(second.stats.new_records, 0);
    assert_eq!(second.stats.existing_records, 2);
    assert!(queue.is_empty());
    assert_eq!(provider.handle().unwrap().count(None).unwrap(), 2);
}

#[tokio::test]
async fn test_snapshot_stored_with_record() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir, &[ARTICLE_A], 1, StoreHandleMode::Shared);
    let provider = StoreProvider::open(&config.database).unwrap();
    let crawler = Crawler::new(config, Arc::new(news_site())).unwrap();

    crawler
        .crawl(&provider, Arc::new(NotificationQueue::new()))
        .await
        .unwrap();

    let url = crawler.classifier().canonicalize(ARTICLE_A).unwrap();
    let record = provider.handle().unwrap().get(&url).unwrap().unwrap();
    assert_eq!(record.canonical_url, ARTICLE_A);
    assert!(record
        .snapshot
        .unwrap()
        .contains("Launch update for Starship Flight 3."));
}

#[tokio::test]
async fn test_failed_fetches_do_not_stop_the_run() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir, &[NEWS_INDEX], 3, StoreHandleMode::PerWorker);
    let provider = StoreProvider::open(&config.database).unwrap();

    // Only the index is served; every article is a 404
    let fetcher = StaticFetcher::new().page(
        NEWS_INDEX,
        index_page(&[
            "/news/2024/01/01/a",
            "/news/2024/01/02/b",
            "/careers/position/1",
            "/media/download/kit.zip",
            "https://twitter.com/spacex",
        ]),
    );
    let crawler = Crawler::new(config, Arc::new(fetcher)).unwrap();
    let queue = Arc::new(NotificationQueue::new());

    let report = crawler.crawl(&provider, Arc::clone(&queue)).await.unwrap();

    assert_eq!(report.stats.pages_fetched, 1);
    assert_eq!(report.stats.fetch_failures, 3);
    assert_eq!(report.urls_seen, 4);
    assert!(queue.is_empty());
    assert_eq!(provider.handle().unwrap().count(None).unwrap(), 0);
}
