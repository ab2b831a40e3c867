//! Worker pool draining the background task queue.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::domain::background_task::BackgroundTask;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;

/// Applies a [`BackgroundTask`] to the store or the cache.
pub struct TaskExecutor {
    links: Arc<dyn LinkRepository>,
    cache: Arc<dyn CacheService>,
    cache_ttl: Duration,
}

impl TaskExecutor {
    pub fn new(
        links: Arc<dyn LinkRepository>,
        cache: Arc<dyn CacheService>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            links,
            cache,
            cache_ttl,
        }
    }

    /// Runs a task exactly once.
    ///
    /// Failures are not retried; a click increment is not idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Cache`] or [`AppError::Storage`] from the
    /// underlying backend.
    pub async fn execute(&self, task: &BackgroundTask) -> Result<(), AppError> {
        match task {
            BackgroundTask::CacheWrite { code, target } => {
                self.cache.set(code, target, self.cache_ttl).await?;
            }
            BackgroundTask::IncrementClicks { code } => {
                self.links.increment_clicks(code).await?;
            }
        }
        Ok(())
    }
}

/// Starts `workers` tasks that share one receiver and run until the queue
/// is closed and drained.
///
/// Failed tasks are logged and counted; they are never reported to clients.
pub fn spawn_workers(
    rx: mpsc::Receiver<BackgroundTask>,
    executor: Arc<TaskExecutor>,
    workers: usize,
) -> Vec<JoinHandle<()>> {
    let rx = Arc::new(Mutex::new(rx));

    (0..workers.max(1))
        .map(|id| {
            let rx = Arc::clone(&rx);
            let executor = Arc::clone(&executor);
            tokio::spawn(async move {
                run_worker(id, rx, executor).await;
            })
        })
        .collect()
}

async fn run_worker(
    id: usize,
    rx: Arc<Mutex<mpsc::Receiver<BackgroundTask>>>,
    executor: Arc<TaskExecutor>,
) {
    debug!(worker = id, "background worker started");

    loop {
        // The lock is held only while waiting for the next task.
        let task = {
            let mut rx = rx.lock().await;
            rx.recv().await
        };

        let Some(task) = task else {
            break;
        };

        match executor.execute(&task).await {
            Ok(()) => record_outcome(&task, "ok"),
            Err(e) => {
                warn!(
                    worker = id,
                    kind = task.kind(),
                    code = task.code(),
                    error = %e,
                    "background task failed"
                );
                record_outcome(&task, "failed");
            }
        }
    }

    debug!(worker = id, "background worker stopped");
}

fn record_outcome(task: &BackgroundTask, outcome: &'static str) {
    metrics::counter!(
        "linkgate_background_tasks_total",
        "kind" => task.kind(),
        "outcome" => outcome
    )
    .increment(1);
}
