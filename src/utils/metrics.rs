use std::sync::Arc;
use tokio::sync::Mutex;
use serde::{Serialize, Deserialize};

use crate::crawler::task::{CrawledPage, FetchFailure, TaskOutcome};

/// Collects task outcomes from every worker of a crawl
#[derive(Debug, Clone, Default)]
pub struct StatsCollector {
    /// In-memory records
    records: Arc<Mutex<CrawlRecords>>,
}

/// Everything recorded during a crawl
#[derive(Debug, Clone, Default)]
pub struct CrawlRecords {
    /// Outcome counters
    pub stats: CrawlStats,

    /// Pages fetched, in resolution order
    pub pages: Vec<CrawledPage>,

    /// Failed fetches, in resolution order
    pub errors: Vec<FetchFailure>,
}

/// Task accounting for a crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CrawlStats {
    /// Tasks placed on the work queue, including the seed
    pub submitted: usize,

    /// Tasks resolved, whatever the outcome
    pub resolved: usize,

    /// Tasks fetched and expanded
    pub expanded: usize,

    /// Tasks skipped because the address was already claimed
    pub duplicates: usize,

    /// Tasks skipped because no depth budget was left
    pub depth_exhausted: usize,

    /// Tasks whose fetch failed
    pub fetch_errors: usize,

    /// Tasks skipped after cancellation
    pub cancelled: usize,

    /// Children that could not be queued and were resolved in place
    pub dropped: usize,
}

impl CrawlStats {
    /// Number of fetch invocations
    pub fn fetches(&self) -> usize {
        self.expanded + self.fetch_errors
    }

    /// Resolutions accounted for by a recorded outcome
    pub fn outcomes(&self) -> usize {
        self.expanded
            + self.duplicates
            + self.depth_exhausted
            + self.fetch_errors
            + self.cancelled
            + self.dropped
    }
}

impl StatsCollector {
    /// Create a new, empty collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record how a task was resolved
    pub async fn record_outcome(&self, outcome: TaskOutcome) {
        let mut records = self.records.lock().await;

        match outcome {
            TaskOutcome::Duplicate => records.stats.duplicates += 1,
            TaskOutcome::DepthExhausted => records.stats.depth_exhausted += 1,
            TaskOutcome::Cancelled => records.stats.cancelled += 1,
            TaskOutcome::FetchFailed(failure) => {
                records.stats.fetch_errors += 1;
                records.errors.push(failure);
            }
            TaskOutcome::Expanded(page) => {
                records.stats.expanded += 1;
                records.pages.push(page);
            }
        }
    }

    /// Record a child task that was resolved without ever being queued
    pub async fn record_dropped(&self) {
        self.records.lock().await.stats.dropped += 1;
    }

    /// Current counters
    pub async fn stats(&self) -> CrawlStats {
        self.records.lock().await.stats
    }

    /// Take everything recorded so far, leaving the collector empty
    pub async fn take(&self) -> CrawlRecords {
        std::mem::take(&mut *self.records.lock().await)
    }
}
