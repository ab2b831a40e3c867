//! Deferred bookkeeping work and the bounded queue that carries it.

use tokio::sync::mpsc;
use tracing::warn;

/// Non-critical work dispatched off the request path.
///
/// Created by [`crate::application::services::LinkService`] after the
/// user-facing part of an operation has completed. Executed by the worker
/// pool in [`crate::domain::task_worker`]. Failures never reach the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackgroundTask {
    /// Populate the cache with `code -> target` (on creation or after a miss).
    CacheWrite { code: String, target: String },
    /// Add one click to the link's counter.
    IncrementClicks { code: String },
}

impl BackgroundTask {
    pub fn cache_write(code: impl Into<String>, target: impl Into<String>) -> Self {
        Self::CacheWrite {
            code: code.into(),
            target: target.into(),
        }
    }

    pub fn increment_clicks(code: impl Into<String>) -> Self {
        Self::IncrementClicks { code: code.into() }
    }

    /// Label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CacheWrite { .. } => "cache_write",
            Self::IncrementClicks { .. } => "increment_clicks",
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Self::CacheWrite { code, .. } | Self::IncrementClicks { code } => code,
        }
    }
}

/// Producer side of the background task queue.
///
/// The queue is bounded; [`TaskQueue::submit`] never waits. A task that does
/// not fit is dropped and counted.
#[derive(Debug, Clone)]
pub struct TaskQueue {
    sender: mpsc::Sender<BackgroundTask>,
}

impl TaskQueue {
    /// Creates a queue holding at most `capacity` pending tasks.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<BackgroundTask>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self { sender }, receiver)
    }

    /// Enqueues a task without waiting.
    ///
    /// Returns `false` if the task was dropped because the queue is full or
    /// the workers have shut down.
    pub fn submit(&self, task: BackgroundTask) -> bool {
        match self.sender.try_send(task) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(task)) => {
                warn!(kind = task.kind(), code = task.code(), "task queue full, dropping task");
                metrics::counter!("linkgate_background_tasks_dropped_total", "kind" => task.kind())
                    .increment(1);
                false
            }
            Err(mpsc::error::TrySendError::Closed(task)) => {
                warn!(kind = task.kind(), code = task.code(), "task queue closed, dropping task");
                metrics::counter!("linkgate_background_tasks_dropped_total", "kind" => task.kind())
                    .increment(1);
                false
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Free slots currently available in the queue.
    pub fn capacity(&self) -> usize {
        self.sender.capacity()
    }

    pub fn max_capacity(&self) -> usize {
        self.sender.max_capacity()
    }
}
