use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared flag asking workers to stop fetching.
///
/// Workers still drain and resolve queued tasks after cancellation, they just
/// skip the fetch, so the crawl winds down through the normal completion path.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
