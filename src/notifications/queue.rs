//! Session-scoped queue of outbound messages
//!
//! Workers push formatted messages while crawling; the publisher pops them
//! after the crawl. A message text is accepted at most once per session, even
//! after it has been popped.

use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct QueueState {
    pending: VecDeque<String>,
    accepted: HashSet<String>,
}

/// Deduplicating FIFO of notification messages
#[derive(Debug, Default)]
pub struct NotificationQueue {
    state: Mutex<QueueState>,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue a message unless identical text was queued before
    pub fn push(&self, message: impl Into<String>) -> bool {
        let message = message.into();
        let mut state = self.lock();
        if state.accepted.contains(&message) {
            return false;
        }
        state.accepted.insert(message.clone());
        state.pending.push_back(message);
        true
    }

    /// Next message in arrival order
    pub fn pop(&self) -> Option<String> {
        self.lock().pending.pop_front()
    }

    /// Remove and return everything still pending
    pub fn drain(&self) -> Vec<String> {
        self.lock().pending.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().pending.is_empty()
    }
}
