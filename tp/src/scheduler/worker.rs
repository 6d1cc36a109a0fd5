//! Worker pool
//!
//! Each worker loops: claim the most urgent eligible task, run its handler to
//! completion, report the outcome. When nothing is eligible it parks until a
//! submission or requeue notifies it, the next delayed task comes due, or the
//! idle poll interval elapses, whichever is first.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info};

use crate::domain::Task;
use crate::handler::HandlerError;

use super::core::Shared;

/// Stand-in for "never" when a wait would overflow `Instant`
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// `now + wait`, saturating to a far-future instant instead of overflowing
pub(crate) fn deadline_after(now: Instant, wait: Duration) -> Instant {
    now.checked_add(wait)
        .or_else(|| now.checked_add(FAR_FUTURE))
        .unwrap_or(now)
}

/// Result of asking the scheduler for work
#[derive(Debug)]
pub(crate) enum Claim {
    /// A task now marked running and owned by the caller
    Task(Task),
    /// Nothing eligible until this instant
    NotYet(Instant),
    /// Queue is empty
    Empty,
}

/// Handles to the spawned workers plus their stop signal
pub(crate) struct WorkerPool {
    stop_tx: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `count` workers sharing one scheduler state
    pub(crate) fn spawn(count: usize, shared: Arc<Shared>) -> Self {
        debug!(count, "WorkerPool::spawn: called");
        let (stop_tx, stop_rx) = watch::channel(false);

        let handles = (0..count)
            .map(|worker_id| {
                let shared = Arc::clone(&shared);
                let stop_rx = stop_rx.clone();
                tokio::spawn(run_worker(worker_id, shared, stop_rx))
            })
            .collect();

        Self { stop_tx, handles }
    }

    /// Tell every worker to exit after its current attempt
    pub(crate) fn signal_stop(&self) {
        self.stop_tx.send_replace(true);
    }

    /// Drop handles of workers that have exited
    pub(crate) fn reap(&mut self) {
        self.handles.retain(|h| !h.is_finished());
    }

    /// Workers still alive
    pub(crate) fn remaining(&self) -> usize {
        self.handles.len()
    }
}

async fn run_worker(worker_id: usize, shared: Arc<Shared>, mut stop_rx: watch::Receiver<bool>) {
    debug!(worker_id, "Worker started");

    loop {
        if *stop_rx.borrow() {
            break;
        }

        // Register interest before looking at the queue so a submit that
        // lands between the check and the wait is not missed
        let notified = shared.notify.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();

        let wake_at = match shared.claim_next(worker_id).await {
            Claim::Task(task) => {
                run_attempt(worker_id, &shared, task).await;
                continue;
            }
            Claim::NotYet(at) => at.min(deadline_after(Instant::now(), shared.config.idle_poll())),
            Claim::Empty => deadline_after(Instant::now(), shared.config.idle_poll()),
        };

        tokio::select! {
            _ = &mut notified => {}
            _ = tokio::time::sleep_until(wake_at) => {}
            changed = stop_rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    shared.worker_exited(worker_id).await;
    debug!(worker_id, "Worker exited");
}

/// Run one attempt to completion and hand the outcome back
async fn run_attempt(worker_id: usize, shared: &Shared, task: Task) {
    let task_id = task.id.clone();
    info!(worker_id, %task_id, name = %task.name, priority = task.priority, attempt = task.attempts, "Executing task");

    let outcome = match shared.registry.get(&task.name) {
        Some(handler) => {
            // A panic surfaces here as a JoinError
            match tokio::spawn(async move { handler.execute(task).await }).await {
                Ok(result) => result,
                Err(e) => {
                    error!(worker_id, %task_id, error = %e, "Handler panicked");
                    Err(HandlerError::transient(format!("Handler panicked: {}", e)))
                }
            }
        }
        None => Err(HandlerError::permanent(format!(
            "No handler registered for '{}'",
            task.name
        ))),
    };

    shared.finish_attempt(worker_id, &task_id, outcome).await;
}
