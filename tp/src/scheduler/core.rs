//! Scheduler implementation

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, Notify};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::domain::{Task, TaskId, TaskSummary};
use crate::handler::{HandlerRegistry, HandlerResult};

use super::config::SchedulerConfig;
use super::error::SchedulerError;
use super::queue::{Dequeue, QueueEntry, TaskQueue};
use super::request::{TaskRequest, validate_priority};
use super::retry::{self, FailureKind, RetryDecision};
use super::ring::RingBuffer;
use super::stats::SchedulerStats;
use super::worker::{Claim, WorkerPool, deadline_after};

/// How often `stop` re-checks whether workers have drained
const DRAIN_POLL: Duration = Duration::from_millis(10);

/// Lifecycle of the worker pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PoolState {
    Idle,
    Running,
    Draining,
}

/// Lifetime counters
#[derive(Debug, Default)]
struct Totals {
    submitted: u64,
    attempts: u64,
    retries: u64,
    completed: u64,
    failed: u64,
}

/// Internal state protected by mutex
pub(crate) struct SchedulerInner {
    /// Pending tasks, eligible or delayed
    queue: TaskQueue,

    /// Records for every pending or running task
    tasks: HashMap<TaskId, Task>,

    /// Tasks with an attempt in flight, by owning worker
    running: HashMap<TaskId, usize>,

    /// Most recent completed tasks
    completed: RingBuffer<Task>,

    /// Most recent permanently failed tasks
    failed: RingBuffer<Task>,

    next_seq: u64,
    started_at: Option<Instant>,
    worker_count: usize,
    pool_state: PoolState,
    totals: Totals,
}

impl SchedulerInner {
    fn new(config: &SchedulerConfig) -> Self {
        Self {
            queue: TaskQueue::new(),
            tasks: HashMap::new(),
            running: HashMap::new(),
            completed: RingBuffer::with_capacity(config.completed_capacity),
            failed: RingBuffer::with_capacity(config.failed_capacity),
            next_seq: 0,
            started_at: None,
            worker_count: 0,
            pool_state: PoolState::Idle,
            totals: Totals::default(),
        }
    }

    fn record_completed(&mut self, task: Task) {
        if let Some(evicted) = self.completed.push(task) {
            debug!(task_id = %evicted.id, "SchedulerInner::record_completed: evicted oldest");
        }
    }

    fn record_failed(&mut self, task: Task) {
        if let Some(evicted) = self.failed.push(task) {
            debug!(task_id = %evicted.id, "SchedulerInner::record_failed: evicted oldest");
        }
    }

    /// Every live task is in exactly one of {queue, running}
    #[cfg(test)]
    pub(crate) fn check_invariants(&self) -> Result<(), String> {
        use crate::domain::TaskStatus;

        for id in self.queue.task_ids() {
            if self.running.contains_key(id) {
                return Err(format!("{} is both queued and running", id));
            }
            match self.tasks.get(id) {
                Some(task) if task.status == TaskStatus::Pending => {}
                Some(task) => return Err(format!("{} is queued with status {}", id, task.status)),
                None => return Err(format!("{} is queued without a record", id)),
            }
        }
        for id in self.running.keys() {
            match self.tasks.get(id) {
                Some(task) if task.status == TaskStatus::Running => {}
                Some(task) => return Err(format!("{} is running with status {}", id, task.status)),
                None => return Err(format!("{} is running without a record", id)),
            }
        }
        if self.tasks.len() != self.queue.len() + self.running.len() {
            return Err(format!(
                "{} records but {} queued + {} running",
                self.tasks.len(),
                self.queue.len(),
                self.running.len()
            ));
        }
        Ok(())
    }
}

/// State shared between the facade and its workers
pub(crate) struct Shared {
    pub(crate) config: SchedulerConfig,
    pub(crate) registry: HandlerRegistry,
    pub(crate) inner: Mutex<SchedulerInner>,
    pub(crate) notify: Notify,
}

impl Shared {
    /// Dequeue the most urgent eligible task and mark it running, atomically
    pub(crate) async fn claim_next(&self, worker_id: usize) -> Claim {
        let mut guard = self.inner.lock().await;
        let inner = &mut *guard;
        let now = Instant::now();

        loop {
            match inner.queue.pop_eligible(now) {
                Dequeue::Ready(entry) => {
                    let Some(task) = inner.tasks.get_mut(&entry.task_id) else {
                        warn!(task_id = %entry.task_id, "Queued entry has no task record, dropping");
                        continue;
                    };
                    debug_assert!(task.is_eligible(now));
                    task.begin_attempt(worker_id, now);
                    let snapshot = task.clone();
                    inner.running.insert(entry.task_id, worker_id);
                    inner.totals.attempts += 1;
                    return Claim::Task(snapshot);
                }
                Dequeue::NotYet(at) => return Claim::NotYet(at),
                Dequeue::Empty => return Claim::Empty,
            }
        }
    }

    /// Record that a worker has left its loop
    pub(crate) async fn worker_exited(&self, worker_id: usize) {
        let mut inner = self.inner.lock().await;
        inner.worker_count = inner.worker_count.saturating_sub(1);
        debug!(worker_id, remaining = inner.worker_count, "Shared::worker_exited: called");
    }

    /// Release a task from the running set and route the attempt's outcome
    pub(crate) async fn finish_attempt(&self, worker_id: usize, task_id: &TaskId, outcome: HandlerResult) {
        let requeued = {
            let mut guard = self.inner.lock().await;
            let inner = &mut *guard;
            inner.running.remove(task_id);

            let Some(mut task) = inner.tasks.remove(task_id) else {
                warn!(worker_id, %task_id, "Finished attempt for unknown task");
                return;
            };
            let now = Instant::now();

            match outcome {
                Ok(result) => {
                    info!(worker_id, %task_id, name = %task.name, %result, "Task completed");
                    task.complete(result, now);
                    inner.totals.completed += 1;
                    inner.record_completed(task);
                    false
                }
                Err(err) => {
                    let kind = FailureKind::from(&err);
                    match retry::decide(task.retries, task.max_retries, kind, task.priority) {
                        RetryDecision::Requeue { priority } => {
                            warn!(
                                worker_id,
                                %task_id,
                                name = %task.name,
                                retry = task.retries + 1,
                                max_retries = task.max_retries,
                                priority,
                                error = %err,
                                "Task failed, requeueing"
                            );
                            task.requeue(priority, err.to_string());
                            inner.queue.push(QueueEntry::for_task(&task), now);
                            inner.tasks.insert(task_id.clone(), task);
                            inner.totals.retries += 1;
                            true
                        }
                        RetryDecision::PermanentFail => {
                            warn!(
                                worker_id,
                                %task_id,
                                name = %task.name,
                                retries = task.retries,
                                ?kind,
                                error = %err,
                                "Task failed permanently"
                            );
                            task.fail(err.to_string(), now);
                            inner.totals.failed += 1;
                            inner.record_failed(task);
                            false
                        }
                    }
                }
            }
        };

        if requeued {
            self.notify.notify_one();
        }
    }
}

/// The Scheduler accepts submissions, dispatches them to a fixed worker
/// pool in priority order once eligible, and retries failures with
/// decaying priority up to each task's retry cap.
pub struct Scheduler {
    shared: Arc<Shared>,
    pool: Mutex<Option<WorkerPool>>,
}

impl Scheduler {
    /// Create a new scheduler with the given configuration and handlers
    pub fn new(config: SchedulerConfig, registry: HandlerRegistry) -> Self {
        debug!(?config, ?registry, "Scheduler::new: called");
        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(SchedulerInner::new(&config)),
                config,
                registry,
                notify: Notify::new(),
            }),
            pool: Mutex::new(None),
        }
    }

    /// The configuration this scheduler was built with
    pub fn config(&self) -> &SchedulerConfig {
        &self.shared.config
    }

    /// Submit a task. Never waits on worker activity.
    pub async fn submit(&self, name: &str, priority: u32, delay: Duration) -> Result<TaskId, SchedulerError> {
        debug!(%name, priority, ?delay, "Scheduler::submit: called");
        if name.trim().is_empty() {
            return Err(SchedulerError::EmptyName);
        }
        validate_priority(priority as i64)?;

        let now = Instant::now();
        let scheduled_at = now
            .checked_add(delay)
            .ok_or_else(|| SchedulerError::InvalidDelay(delay.as_secs_f64().to_string()))?;

        let id = {
            let mut inner = self.shared.inner.lock().await;
            inner.next_seq += 1;
            let seq = inner.next_seq;
            let id = TaskId::new(seq);
            let task = Task::new(
                id.clone(),
                name,
                priority,
                seq,
                scheduled_at,
                self.shared.config.max_retries,
            );
            inner.queue.push(QueueEntry::for_task(&task), now);
            inner.tasks.insert(id.clone(), task);
            inner.totals.submitted += 1;
            id
        };

        debug!(%id, "Scheduler::submit: queued");
        self.shared.notify.notify_one();
        Ok(id)
    }

    /// Submit from a loosely-typed request, validating every field
    pub async fn submit_request(&self, request: &TaskRequest) -> Result<TaskId, SchedulerError> {
        debug!(?request, "Scheduler::submit_request: called");
        let valid = request.validate(self.shared.config.default_priority)?;
        self.submit(&valid.name, valid.priority, valid.delay).await
    }

    /// Spawn the worker pool. No-op if it is already running.
    ///
    /// After a `stop` that timed out, the old pool is replaced once its
    /// workers have all exited; until then this returns
    /// [`SchedulerError::StillDraining`].
    pub async fn start(&self, worker_count: usize) -> Result<(), SchedulerError> {
        debug!(worker_count, "Scheduler::start: called");
        if worker_count == 0 {
            return Err(SchedulerError::InvalidWorkerCount(worker_count));
        }

        let mut pool = self.pool.lock().await;
        let mut inner = self.shared.inner.lock().await;

        if let Some(existing) = pool.as_mut() {
            if inner.pool_state == PoolState::Running {
                debug!("Scheduler::start: already running, ignoring");
                return Ok(());
            }

            // Left over from a stop that timed out
            existing.reap();
            let in_flight = existing.remaining();
            if in_flight > 0 {
                warn!(in_flight, "Scheduler::start: previous pool still draining");
                return Err(SchedulerError::StillDraining { in_flight });
            }
            debug!("Scheduler::start: previous pool drained, replacing");
        }

        inner.started_at.get_or_insert_with(Instant::now);
        inner.worker_count = worker_count;
        inner.pool_state = PoolState::Running;
        drop(inner);

        *pool = Some(WorkerPool::spawn(worker_count, Arc::clone(&self.shared)));
        info!(worker_count, "Scheduler started");
        Ok(())
    }

    /// Stop dispatching and wait up to `timeout` for in-flight attempts
    ///
    /// Running handlers are never interrupted. If they outlast the timeout
    /// this returns [`SchedulerError::DrainIncomplete`] and the workers keep
    /// going until their current attempt ends; calling `stop` again resumes
    /// the wait. Pending tasks stay queued and queryable.
    pub async fn stop(&self, timeout: Duration) -> Result<(), SchedulerError> {
        debug!(?timeout, "Scheduler::stop: called");
        let mut guard = self.pool.lock().await;
        let Some(pool) = guard.as_mut() else {
            debug!("Scheduler::stop: not running");
            return Ok(());
        };

        pool.signal_stop();
        self.shared.inner.lock().await.pool_state = PoolState::Draining;

        let deadline = deadline_after(Instant::now(), timeout);
        loop {
            pool.reap();
            if pool.remaining() == 0 {
                break;
            }

            let now = Instant::now();
            if now >= deadline {
                let in_flight = pool.remaining();
                warn!(?timeout, in_flight, "Scheduler stop timed out with attempts in flight");
                return Err(SchedulerError::DrainIncomplete { timeout, in_flight });
            }
            tokio::time::sleep(DRAIN_POLL.min(deadline - now)).await;
        }

        *guard = None;
        {
            let mut inner = self.shared.inner.lock().await;
            inner.worker_count = 0;
            inner.pool_state = PoolState::Idle;
        }
        info!("Scheduler stopped");
        Ok(())
    }

    /// Whether workers are accepting new tasks
    pub async fn is_running(&self) -> bool {
        self.shared.inner.lock().await.pool_state == PoolState::Running
    }

    /// Point-in-time counts
    pub async fn stats(&self) -> SchedulerStats {
        debug!("Scheduler::stats: called");
        let mut inner = self.shared.inner.lock().await;
        inner.queue.promote(Instant::now());

        SchedulerStats {
            queued: inner.queue.len(),
            delayed: inner.queue.delayed_len(),
            running: inner.running.len(),
            completed_count: inner.totals.completed,
            failed_count: inner.totals.failed,
            worker_count: inner.worker_count,
            uptime: inner.started_at.map(|s| s.elapsed()).unwrap_or_default(),
            total_submitted: inner.totals.submitted,
            total_attempts: inner.totals.attempts,
            total_retries: inner.totals.retries,
        }
    }

    /// Snapshot of a task, or None if unknown or evicted from the terminal buffers
    pub async fn get_task(&self, task_id: &TaskId) -> Option<Task> {
        debug!(%task_id, "Scheduler::get_task: called");
        let inner = self.shared.inner.lock().await;

        inner
            .tasks
            .get(task_id)
            .or_else(|| inner.completed.find(|t| &t.id == task_id))
            .or_else(|| inner.failed.find(|t| &t.id == task_id))
            .cloned()
    }

    /// Retained completed tasks, oldest first
    pub async fn completed(&self) -> Vec<TaskSummary> {
        let inner = self.shared.inner.lock().await;
        inner.completed.iter().map(Task::summary).collect()
    }

    /// Retained failed tasks, oldest first
    pub async fn failed(&self) -> Vec<TaskSummary> {
        let inner = self.shared.inner.lock().await;
        inner.failed.iter().map(Task::summary).collect()
    }

    #[cfg(test)]
    pub(crate) async fn check_invariants(&self) -> Result<(), String> {
        self.shared.inner.lock().await.check_invariants()
    }
}
