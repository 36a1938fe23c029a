//! Paced drain of the notification queue
//!
//! The publisher runs once, after the crawl has fully drained. On a cold start
//! (the store was empty before the run) every queued message is discarded:
//! the first run records the whole site and announcing all of it would flood
//! the channel.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use super::channels::log::LogChannel;
use super::channels::webhook::{WebhookChannel, WebhookConfig};
use super::channels::Channel;
use super::queue::NotificationQueue;
use crate::config::PublisherConfig;
use crate::error::Result;

/// Outcome of one publishing pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PublishReport {
    /// Messages the channel accepted
    pub sent: usize,
    /// Messages dropped after a failed send
    pub failed: usize,
    /// Messages discarded by the cold-start guard
    pub suppressed: usize,
}

/// Sends queued messages through one channel at a fixed pace
pub struct Publisher {
    channel: Arc<dyn Channel>,
    interval: Duration,
}

impl Publisher {
    /// Create a publisher over an explicit channel
    pub fn new(channel: Arc<dyn Channel>, interval: Duration) -> Self {
        Self { channel, interval }
    }

    /// Pick the channel from configuration
    ///
    /// Dry runs and configurations without a webhook fall back to
    /// [`LogChannel`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Publish`](crate::error::Error::Publish) when the
    /// webhook settings are invalid.
    pub fn from_config(config: &PublisherConfig) -> Result<Self> {
        let channel: Arc<dyn Channel> = match WebhookConfig::from_publisher(config) {
            Some(webhook) if !config.dry_run => Arc::new(WebhookChannel::new(webhook)?),
            _ => Arc::new(LogChannel),
        };

        Ok(Self::new(channel, config.interval()))
    }

    /// Name of the channel in use
    pub fn channel_name(&self) -> &str {
        self.channel.name()
    }

    /// Drain `queue` through the channel
    ///
    /// Consecutive sends are at least `interval` apart. Failures are logged and
    /// the message is dropped. Stops as soon as the queue is observed empty.
    pub async fn publish(&self, queue: &NotificationQueue, was_cold_start: bool) -> PublishReport {
        let mut report = PublishReport::default();

        if was_cold_start {
            report.suppressed = queue.drain().len();
            tracing::info!(
                suppressed = report.suppressed,
                "Cold start: notifications suppressed for this run"
            );
            return report;
        }

        let mut first = true;
        while let Some(message) = queue.pop() {
            if !first {
                tokio::time::sleep(self.interval).await;
            }
            first = false;

            match self.channel.send(&message).await {
                Ok(status) => {
                    tracing::info!(%status, text = %message, "Notification sent");
                    report.sent += 1;
                }
                Err(e) => {
                    // Dropped either way; a later run will not resend it
                    tracing::error!(
                        error = %e,
                        recoverable = e.is_recoverable(),
                        text = %message,
                        "Failed to send notification"
                    );
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            sent = report.sent,
            failed = report.failed,
            "Notification queue drained"
        );
        report
    }
}
