//! Notifications for newly discovered pages
//!
//! ```text
//!   workers ──push──▶ NotificationQueue ──pop──▶ Publisher ──send──▶ Channel
//!                      (dedup by text)          (paced, after       (webhook | log)
//!                                                 the crawl)
//! ```

pub mod channels;
pub mod publisher;
pub mod queue;

use crate::models::{CanonicalUrl, Category};
use crate::utils::truncate_text;

pub use channels::webhook::WebhookChannel;
pub use channels::{Channel, ChannelError};
pub use publisher::{PublishReport, Publisher};
pub use queue::NotificationQueue;

/// Longest title carried in a message
pub const MAX_TITLE_CHARS: usize = 200;

/// Outbound text for one discovery
///
/// `New <noun>: <title> <url>`, or `New <noun>: <url>` without a title.
pub fn format_message(category: Category, title: Option<&str>, url: &CanonicalUrl) -> String {
    match title.map(str::trim).filter(|t| !t.is_empty()) {
        Some(title) => format!(
            "New {}: {} {url}",
            category.noun(),
            truncate_text(title, MAX_TITLE_CHARS)
        ),
        None => format!("New {}: {url}", category.noun()),
    }
}
