//! Cold-start suppression and paced publishing after a crawl

use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use sitewatch::config::StoreHandleMode;
use sitewatch::crawler::Crawler;
use sitewatch::notifications::{NotificationQueue, PublishReport, Publisher};
use sitewatch::storage::StoreProvider;

use crate::common::{article_page, index_page, test_config, RecordingChannel, StaticFetcher};

const PRESS_INDEX: &str = "https://spacex.com/press";

fn press_site() -> StaticFetcher {
    StaticFetcher::new()
        .page(
            PRESS_INDEX,
            index_page(&[
                "/press/2019/01/01/first",
                "/press/2019/02/02/second",
                "/press/2019/03/03/third",
            ]),
        )
        .page("https://spacex.com/press/2019/01/01/first", article_page("First"))
        .page("https://spacex.com/press/2019/02/02/second", article_page("Second"))
        .page("https://spacex.com/press/2019/03/03/third", article_page("Third"))
}

#[tokio::test]
async fn test_cold_start_sends_nothing() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir, &[PRESS_INDEX], 2, StoreHandleMode::PerWorker);
    let provider = StoreProvider::open(&config.database).unwrap();
    let crawler = Crawler::new(config, Arc::new(press_site())).unwrap();
    let queue = Arc::new(NotificationQueue::new());

    let report = crawler.crawl(&provider, Arc::clone(&queue)).await.unwrap();
    assert!(report.was_cold_start);
    assert_eq!(report.stats.new_records, 3);

    let channel = Arc::new(RecordingChannel::default());
    let publisher = Publisher::new(channel.clone(), Duration::from_secs(1));
    let published = publisher.publish(&queue, report.was_cold_start).await;

    assert_eq!(
        published,
        PublishReport {
            sent: 0,
            failed: 0,
            suppressed: 3
        }
    );
    assert!(channel.messages().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_warm_start_sends_paced() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir, &[PRESS_INDEX], 2, StoreHandleMode::Shared);
    let provider = StoreProvider::open(&config.database).unwrap();
    let crawler = Crawler::new(config, Arc::new(press_site())).unwrap();

    // One release is already known from an earlier run
    let known = crawler
        .classifier()
        .canonicalize("/press/2019/02/02/second")
        .unwrap();
    provider.handle().unwrap().add(&known, None).unwrap();

    let queue = Arc::new(NotificationQueue::new());
    let report = crawler.crawl(&provider, Arc::clone(&queue)).await.unwrap();
    assert!(!report.was_cold_start);
    assert_eq!(report.stats.new_records, 2);
    assert_eq!(report.stats.existing_records, 1);

    let channel = Arc::new(RecordingChannel::default());
    let publisher = Publisher::new(channel.clone(), Duration::from_secs(1));
    let published = publisher.publish(&queue, report.was_cold_start).await;

    assert_eq!(published.sent, 2);
    assert_eq!(published.suppressed, 0);

    let mut messages = channel.messages();
    messages.sort();
    assert_eq!(
        messages,
        vec![
            "New press release: First https://spacex.com/press/2019/01/01/first".to_string(),
            "New press release: Third https://spacex.com/press/2019/03/03/third".to_string(),
        ]
    );

    let times = channel.send_times();
    assert_eq!(times.len(), 2);
    assert!(times[1] - times[0] >= Duration::from_secs(1));
    assert_eq!(provider.handle().unwrap().count(None).unwrap(), 3);
}
