//! Scheduler for managing the crawl queue
//!
//! This module handles:
//! - Strict FIFO ordering of pending work (breadth-first by discovery time)
//! - At-most-once admission of each canonical URL per run
//! - The run state machine (Idle → Running → Draining → Idle)

use std::collections::{HashSet, VecDeque};
use std::hash::{Hash, Hasher};

/// A URL queued for fetching
///
/// Carries the Link that discovered it (`None` for the seed). Equality and
/// hashing only look at the canonical URL, so the same destination reached
/// through two different links is one item.
#[derive(Debug, Clone)]
pub struct CrawlItem {
    /// Canonical URL to fetch
    pub url: String,

    /// ID of the Link that produced this item
    pub via_link: Option<i64>,
}

impl CrawlItem {
    /// Creates the item for a crawl seed
    pub fn seed(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            via_link: None,
        }
    }

    /// Creates the item for a link destination
    pub fn from_link(url: impl Into<String>, link_id: i64) -> Self {
        Self {
            url: url.into(),
            via_link: Some(link_id),
        }
    }
}

impl PartialEq for CrawlItem {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url
    }
}

impl Eq for CrawlItem {}

impl Hash for CrawlItem {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.url.hash(state);
    }
}

/// Lifecycle of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// No run in progress
    Idle,
    /// Run started, nothing dequeued yet
    Running,
    /// An item has been dequeued and is being processed
    Draining,
}

/// Scheduler owns the pending work queue
///
/// Admission is remembered for the whole run: an item that is pending or
/// was already dequeued is never admitted again.
pub struct Scheduler {
    /// Pending items, front is next
    pending: VecDeque<CrawlItem>,

    /// Every item admitted during this run
    admitted: HashSet<CrawlItem>,

    state: RunState,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    /// Creates an idle scheduler with an empty queue
    pub fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            admitted: HashSet::new(),
            state: RunState::Idle,
        }
    }

    /// Clears all queue state and enters `Running`
    pub fn start(&mut self) {
        self.pending.clear();
        self.admitted.clear();
        self.state = RunState::Running;
    }

    /// Appends an item unless an equal one was already admitted this run
    ///
    /// # Returns
    ///
    /// `true` if the item was queued, `false` if it was a duplicate
    pub fn enqueue(&mut self, item: CrawlItem) -> bool {
        if self.admitted.contains(&item) {
            tracing::trace!("Already admitted: {}", item.url);
            return false;
        }

        self.admitted.insert(item.clone());
        self.pending.push_back(item);
        true
    }

    /// Records a URL reached outside the queue, such as a redirect hop
    ///
    /// It is never admitted again this run, and a pending copy is dropped.
    ///
    /// # Returns
    ///
    /// `true` if the URL had not been admitted before
    pub fn mark_admitted(&mut self, url: &str) -> bool {
        let item = CrawlItem::seed(url);
        if self.admitted.contains(&item) {
            let before = self.pending.len();
            self.pending.retain(|pending| pending.url != url);
            if self.pending.len() != before {
                tracing::trace!("Dropped pending copy of {}", url);
            }
            return false;
        }

        self.admitted.insert(item);
        true
    }

    /// Pops the front of the queue
    ///
    /// Moves to `Draining` when an item is returned, and back to `Idle` once
    /// the queue is empty.
    pub fn next_item(&mut self) -> Option<CrawlItem> {
        match self.pending.pop_front() {
            Some(item) => {
                self.state = RunState::Draining;
                Some(item)
            }
            None => {
                self.state = RunState::Idle;
                None
            }
        }
    }

    /// Forces the scheduler back to `Idle`, dropping pending work
    pub fn halt(&mut self) {
        self.pending.clear();
        self.state = RunState::Idle;
    }

    /// Returns the number of pending items
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Returns whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Returns the number of distinct items admitted during this run
    pub fn admitted_len(&self) -> usize {
        self.admitted.len()
    }

    /// Returns the current run state
    pub fn state(&self) -> RunState {
        self.state
    }
}
