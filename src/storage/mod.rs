pub mod queue;

// Re-export common types
pub use queue::{QueueManager, QueueError};
