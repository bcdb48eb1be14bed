use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;
use tracing::{debug, error};

/// Counts tasks that have been submitted but not yet resolved.
///
/// Workers both consume and produce tasks, so an empty queue says nothing
/// about whether more work can appear. The crawl is over exactly when this
/// count returns to zero.
#[derive(Debug, Default)]
pub struct CompletionTracker {
    /// Submitted but not yet resolved
    outstanding: AtomicUsize,

    /// Total `submitted()` calls
    submitted: AtomicUsize,

    /// Total `resolved()` calls that matched a submission
    resolved: AtomicUsize,

    /// Woken when the outstanding count drops to zero
    drained: Notify,
}

impl CompletionTracker {
    /// Create a tracker with nothing outstanding
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a task placed on the work queue.
    ///
    /// Must be called before the task becomes visible to workers, and before
    /// the parent task is resolved.
    pub fn submitted(&self) {
        self.submitted.fetch_add(1, Ordering::SeqCst);
        self.outstanding.fetch_add(1, Ordering::SeqCst);
    }

    /// Record a task that has finished, whatever the outcome
    pub fn resolved(&self) {
        let previous = self.outstanding.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |count| {
            count.checked_sub(1)
        });

        match previous {
            Ok(1) => {
                self.resolved.fetch_add(1, Ordering::SeqCst);
                debug!("Outstanding count reached zero");
                self.drained.notify_waiters();
            }
            Ok(_) => {
                self.resolved.fetch_add(1, Ordering::SeqCst);
            }
            Err(_) => {
                error!("Task resolved with no outstanding submissions; ignoring");
            }
        }
    }

    /// Wait until the outstanding count is zero.
    ///
    /// Returns immediately if nothing is outstanding.
    pub async fn wait(&self) {
        loop {
            let drained = self.drained.notified();
            tokio::pin!(drained);

            // Register interest before reading the count so a concurrent
            // `notify_waiters` between the load and the await is not lost.
            drained.as_mut().enable();

            if self.outstanding() == 0 {
                return;
            }

            drained.await;
        }
    }

    /// Current outstanding count
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }

    /// Total tasks submitted so far
    pub fn submitted_total(&self) -> usize {
        self.submitted.load(Ordering::SeqCst)
    }

    /// Total tasks resolved so far
    pub fn resolved_total(&self) -> usize {
        self.resolved.load(Ordering::SeqCst)
    }
}
