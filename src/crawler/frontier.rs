//! Shared crawl frontier
//!
//! The frontier owns every piece of mutable crawl state: the FIFO of pending URLs,
//! the set of URLs ever enqueued, the set of URLs whose fetch attempt finished,
//! and the number of URLs currently leased to workers. All of it lives behind a
//! single mutex, so dedup-check-and-insert and the completion test are each one
//! critical section.
//!
//! # Termination
//!
//! The crawl is complete when `pending` is empty AND nothing is in flight. An empty
//! queue alone is not enough: a worker still fetching a page may be about to
//! enqueue its links. Workers waiting in [`Frontier::dequeue`] park on a `Notify`
//! and are woken by every enqueue and by the transition to complete.

use crate::url::strip_fragment;
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;

#[derive(Debug, Default)]
struct FrontierState {
    pending: VecDeque<String>,
    seen: HashSet<String>,
    visited: HashSet<String>,
    in_flight: usize,
    complete: bool,
}

impl FrontierState {
    fn is_drained(&self) -> bool {
        self.pending.is_empty() && self.in_flight == 0
    }
}

/// Concurrency-safe queue of pending URLs with dedup and in-flight tracking
#[derive(Debug, Default)]
pub struct Frontier {
    state: Mutex<FrontierState>,
    changed: Notify,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a frontier whose queue holds just `seed`
    pub fn with_seed(seed: &str) -> Self {
        let frontier = Self::new();
        frontier.enqueue(seed);
        frontier
    }

    // Crawl state is only mutated in short, non-panicking sections, so a poisoned
    // lock still guards consistent data.
    fn lock(&self) -> MutexGuard<'_, FrontierState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds a URL to the queue unless it was ever enqueued before
    ///
    /// The fragment is stripped first. Returns true if the URL was added.
    pub fn enqueue(&self, url: &str) -> bool {
        let url = strip_fragment(url);

        let added = {
            let mut state = self.lock();
            if state.complete || state.seen.contains(url) {
                false
            } else {
                state.seen.insert(url.to_string());
                state.pending.push_back(url.to_string());
                true
            }
        };

        if added {
            self.changed.notify_waiters();
        }
        added
    }

    /// Returns true if the URL (fragment ignored) was ever enqueued
    pub fn has_seen(&self, url: &str) -> bool {
        self.lock().seen.contains(strip_fragment(url))
    }

    /// Takes the next URL without waiting
    ///
    /// Returns None if the queue is momentarily empty or the crawl is complete.
    pub fn try_dequeue(self: &Arc<Self>) -> Option<Lease> {
        match self.poll_dequeue() {
            DequeueState::Ready(lease) => lease,
            DequeueState::Wait => None,
        }
    }

    /// Takes the next URL, waiting while other workers still have URLs in flight
    ///
    /// Returns None once the frontier is drained; every waiting caller observes
    /// that exactly once and no further URLs are handed out afterwards.
    pub async fn dequeue(self: &Arc<Self>) -> Option<Lease> {
        loop {
            // Registered before the state check so a wakeup between the check
            // and the await is not lost.
            let changed = self.changed.notified();

            match self.poll_dequeue() {
                DequeueState::Ready(lease) => return lease,
                DequeueState::Wait => changed.await,
            }
        }
    }

    fn poll_dequeue(self: &Arc<Self>) -> DequeueState {
        let mut state = self.lock();

        if state.complete {
            return DequeueState::Ready(None);
        }

        if let Some(url) = state.pending.pop_front() {
            state.in_flight += 1;
            return DequeueState::Ready(Some(Lease {
                frontier: Arc::clone(self),
                url,
                settled: false,
            }));
        }

        if state.in_flight == 0 {
            state.complete = true;
            drop(state);
            tracing::debug!("Frontier drained");
            self.changed.notify_waiters();
            return DequeueState::Ready(None);
        }

        DequeueState::Wait
    }

    fn finish(&self, url: &str, visited: bool) {
        let completed = {
            let mut state = self.lock();
            if visited {
                state.visited.insert(url.to_string());
            }
            state.in_flight = state.in_flight.saturating_sub(1);

            if !state.complete && state.is_drained() {
                state.complete = true;
                true
            } else {
                false
            }
        };

        if completed {
            tracing::debug!("Frontier drained after {}", url);
            self.changed.notify_waiters();
        }
    }

    /// Returns true if no URL is currently waiting in the queue
    ///
    /// URLs may still be in flight; see [`Frontier::is_complete`].
    pub fn is_empty(&self) -> bool {
        self.lock().pending.is_empty()
    }

    /// Returns true once the queue is empty with nothing in flight
    pub fn is_complete(&self) -> bool {
        self.lock().complete
    }

    /// Number of URLs waiting in the queue
    pub fn pending_len(&self) -> usize {
        self.lock().pending.len()
    }

    /// Number of URLs leased to workers
    pub fn in_flight(&self) -> usize {
        self.lock().in_flight
    }

    /// Number of distinct URLs ever enqueued
    pub fn seen_len(&self) -> usize {
        self.lock().seen.len()
    }

    /// Snapshot of URLs whose fetch attempt has finished
    pub fn visited(&self) -> HashSet<String> {
        self.lock().visited.clone()
    }
}

enum DequeueState {
    Ready(Option<Lease>),
    Wait,
}

/// A URL handed to exactly one worker
///
/// Dropping the lease marks the URL visited and decrements the in-flight count,
/// so a worker that unwinds mid-page still lets the crawl terminate.
#[derive(Debug)]
pub struct Lease {
    frontier: Arc<Frontier>,
    url: String,
    settled: bool,
}

impl Lease {
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Records the fetch attempt as finished
    pub fn mark_visited(mut self) {
        self.settle(true);
    }

    /// Gives the URL up without recording a visit (used on cancellation)
    pub fn abandon(mut self) {
        self.settle(false);
    }

    fn settle(&mut self, visited: bool) {
        if !self.settled {
            self.settled = true;
            self.frontier.finish(&self.url, visited);
        }
    }
}

impl Drop for Lease {
    fn drop(&mut self) {
        self.settle(true);
    }
}
