//! Deduplicating URL frontier for one crawl run
//!
//! The frontier owns a FIFO of pending URLs and the set of every URL it has
//! ever accepted during the run. Both live behind one lock, so the membership
//! check and the enqueue are a single step: two workers discovering the same
//! link at the same moment cannot both enqueue it.
//!
//! Completion is tracked as `queued + in flight`. A URL counts as in flight
//! from [`Frontier::get`] until the matching [`Frontier::done`]. When the count
//! reaches zero the run is over: blocked `get` calls return `None` and
//! [`Frontier::drained`] resolves.

use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::Notify;

use crate::models::CanonicalUrl;

#[derive(Debug, Default)]
struct FrontierState {
    queue: VecDeque<CanonicalUrl>,
    seen: HashSet<CanonicalUrl>,
    in_flight: usize,
}

impl FrontierState {
    fn pending(&self) -> usize {
        self.queue.len() + self.in_flight
    }
}

/// Concurrent, deduplicating queue of URLs pending fetch
#[derive(Debug, Default)]
pub struct Frontier {
    state: Mutex<FrontierState>,
    changed: Notify,
}

impl Frontier {
    /// Create an empty frontier
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, FrontierState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Enqueue a URL unless it was already accepted during this run
    ///
    /// # Returns
    ///
    /// `true` if the URL was new and is now queued
    pub fn put(&self, url: CanonicalUrl) -> bool {
        let inserted = {
            let mut state = self.lock();
            if state.seen.contains(&url) {
                false
            } else {
                state.seen.insert(url.clone());
                state.queue.push_back(url);
                true
            }
        };

        if inserted {
            self.changed.notify_waiters();
        }
        inserted
    }

    /// Take the next URL, waiting while other workers may still add more
    ///
    /// Returns `None` once nothing is queued and nothing is in flight.
    pub async fn get(&self) -> Option<CanonicalUrl> {
        loop {
            // Register interest before inspecting state so a wakeup between
            // the check and the await is not lost.
            let notified = self.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = self.lock();
                if let Some(url) = state.queue.pop_front() {
                    state.in_flight += 1;
                    return Some(url);
                }
                if state.pending() == 0 {
                    return None;
                }
            }

            notified.await;
        }
    }

    /// Mark one URL returned by [`get`](Self::get) as fully processed
    pub fn done(&self) {
        let finished = {
            let mut state = self.lock();
            if state.in_flight == 0 {
                tracing::warn!("Frontier::done called with nothing in flight");
                return;
            }
            state.in_flight -= 1;
            state.pending() == 0
        };

        if finished {
            self.changed.notify_waiters();
        }
    }

    /// Resolve once every accepted URL has been processed
    pub async fn drained(&self) {
        loop {
            let notified = self.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.is_drained() {
                return;
            }

            notified.await;
        }
    }

    /// Whether nothing is queued and nothing is in flight
    pub fn is_drained(&self) -> bool {
        self.lock().pending() == 0
    }

    /// Queued plus in-flight URLs
    pub fn pending(&self) -> usize {
        self.lock().pending()
    }

    /// Number of distinct URLs accepted during this run
    pub fn seen_count(&self) -> usize {
        self.lock().seen.len()
    }
}
