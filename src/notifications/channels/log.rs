//! Channel that writes notifications to the log instead of sending them

use async_trait::async_trait;

use super::{Channel, ChannelResult, DeliveryStatus};

/// Dry-run channel
#[derive(Debug, Default, Clone, Copy)]
pub struct LogChannel;

#[async_trait]
impl Channel for LogChannel {
    fn name(&self) -> &str {
        "log"
    }

    async fn send(&self, message: &str) -> ChannelResult<DeliveryStatus> {
        tracing::info!(text = message, "Notification (not sent)");
        Ok(DeliveryStatus::success("log"))
    }
}
