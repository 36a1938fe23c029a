use anyhow::{Context, Result};
use serde::Serialize;
use std::sync::Arc;

use sitewatch::config::Config;
use sitewatch::crawler::{CrawlReport, Crawler};
use sitewatch::error::{Error, SitewatchErrorTrait};
use sitewatch::notifications::{NotificationQueue, PublishReport, Publisher};
use sitewatch::storage::StoreProvider;

#[derive(Serialize)]
struct Summary<'a> {
    crawl: &'a CrawlReport,
    publish: &'a PublishReport,
    channel: &'a str,
}

pub async fn crawl(config: Config, format: &str) -> Result<()> {
    config.validate().context("Invalid configuration")?;

    tracing::info!(host = %config.site.host, "Starting crawl");

    let provider = StoreProvider::open(&config.database).with_context(|| {
        format!(
            "Failed to open link store: {}",
            config.database.sqlite_path.display()
        )
    })?;

    let publisher = Publisher::from_config(&config.publisher)
        .map_err(log_failure)
        .context("Failed to set up notification channel")?;

    let crawler = Crawler::with_http(config)
        .map_err(log_failure)
        .context("Failed to create crawler")?;
    let queue = Arc::new(NotificationQueue::new());

    let report = crawler
        .crawl(&provider, Arc::clone(&queue))
        .await
        .map_err(log_failure)?;
    let published = publisher.publish(&queue, report.was_cold_start).await;

    match format.to_lowercase().as_str() {
        "json" => println!(
            "{}",
            summary_json(&report, &published, publisher.channel_name())?
        ),
        _ => print_summary(&report, &published, publisher.channel_name()),
    }

    Ok(())
}

fn summary_json(report: &CrawlReport, published: &PublishReport, channel: &str) -> Result<String> {
    let summary = Summary {
        crawl: report,
        publish: published,
        channel,
    };
    serde_json::to_string_pretty(&summary).context("Failed to serialize summary")
}

/// Log a setup or crawl failure with its category before it becomes an `anyhow` chain
fn log_failure(err: Error) -> Error {
    tracing::error!(
        category = %err.category(),
        recoverable = err.is_recoverable(),
        error = %err,
        "Crawl aborted"
    );
    err
}

fn print_summary(report: &CrawlReport, published: &PublishReport, channel: &str) {
    let elapsed = report.finished_at - report.started_at;
    println!();
    println!("Crawl Summary");
    println!("-------------");
    println!("URLs seen:        {}", report.urls_seen);
    println!("Pages fetched:    {}", report.stats.pages_fetched);
    println!("Fetch failures:   {}", report.stats.fetch_failures);
    println!("New records:      {}", report.stats.new_records);
    println!("Existing records: {}", report.stats.existing_records);
    println!("Store failures:   {}", report.stats.store_failures);
    println!("Elapsed:          {:.1}s", elapsed.num_milliseconds() as f64 / 1000.0);
    println!();
    if report.was_cold_start {
        println!(
            "Cold start: {} notification(s) suppressed",
            published.suppressed
        );
    } else {
        println!(
            "Notifications via {channel}: {} sent, {} failed",
            published.sent, published.failed
        );
    }
}
