use thiserror::Error;
use tokio::sync::{mpsc, Mutex};
use tracing::debug;

use crate::crawler::task::Task;

/// Errors raised by the work queue
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    /// The queue was shut down before the task could be pushed
    #[error("work queue is closed, dropped task for {0}")]
    Closed(String),
}

/// Unbounded in-memory queue of pending tasks, shared by every worker.
///
/// Any number of producers may push. Consumers take turns on the receiver, so
/// each task is handed to exactly one worker.
pub struct QueueManager {
    /// Sending half. `None` once the queue is closed
    sender: Mutex<Option<mpsc::UnboundedSender<Task>>>,

    /// Receiving half, shared by all consumers
    receiver: Mutex<mpsc::UnboundedReceiver<Task>>,
}

impl QueueManager {
    /// Create a new, open queue
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();

        Self {
            sender: Mutex::new(Some(sender)),
            receiver: Mutex::new(receiver),
        }
    }

    /// Push a task to the queue
    pub async fn push_task(&self, task: Task) -> Result<(), QueueError> {
        let sender = self.sender.lock().await;

        let Some(sender) = sender.as_ref() else {
            return Err(QueueError::Closed(task.address));
        };

        debug!("Pushed task to queue: {} (depth {})", task.address, task.remaining_depth);

        sender
            .send(task)
            .map_err(|mpsc::error::SendError(task)| QueueError::Closed(task.address))
    }

    /// Pop a task from the queue, waiting while it is empty.
    ///
    /// Returns `None` once the queue is closed and drained.
    pub async fn pop_task(&self) -> Option<Task> {
        let mut receiver = self.receiver.lock().await;
        receiver.recv().await
    }

    /// Close the queue.
    ///
    /// Pending tasks can still be popped. After that every `pop_task` returns
    /// `None`, including calls already waiting.
    pub async fn close(&self) {
        if self.sender.lock().await.take().is_some() {
            debug!("Work queue closed");
        }
    }

    /// Whether `close` has been called
    pub async fn is_closed(&self) -> bool {
        self.sender.lock().await.is_none()
    }
}

impl Default for QueueManager {
    fn default() -> Self {
        Self::new()
    }
}
