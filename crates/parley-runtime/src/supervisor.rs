//! Supervised background tasks.
//!
//! Every run spawned by the orchestrator gets a supervisor task that joins
//! it, so its completion (normal, error, or panic) is observed exactly once
//! even when no client is left reading the stream.

use std::future::Future;

use tokio::sync::oneshot;

/// Completion handle for a supervised task. Resolves after the supervisor
/// has observed the task outcome. Dropping the handle does not cancel the
/// task or the supervisor.
pub struct TaskCompletion {
    done: oneshot::Receiver<()>,
}

impl TaskCompletion {
    /// Wait until the task outcome has been observed.
    pub async fn finished(self) {
        // The supervisor never drops its sender before sending.
        let _ = self.done.await;
    }
}

/// Spawn `fut` with a supervisor that joins it and logs abnormal
/// termination.
pub fn spawn_supervised<F>(label: &'static str, fut: F) -> TaskCompletion
where
    F: Future<Output = ()> + Send + 'static,
{
    let (done_tx, done_rx) = oneshot::channel();
    let handle = tokio::spawn(fut);
    tokio::spawn(async move {
        if let Err(join_error) = handle.await {
            tracing::error!(task = label, error = %join_error, "background task terminated abnormally");
        }
        let _ = done_tx.send(());
    });
    TaskCompletion { done: done_rx }
}
