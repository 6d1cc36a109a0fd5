//! Task domain type
//!
//! One unit of work and its lifecycle state. Monotonic instants drive
//! scheduling; the wall-clock submission time is kept for display only.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use super::id::TaskId;

/// Task lifecycle status
///
/// `Pending -> Running -> {Completed | Failed}`, with `Running -> Pending`
/// when a failed attempt is requeued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Queued, or waiting for its scheduled time
    #[default]
    Pending,
    /// Exactly one attempt in flight
    Running,
    /// Handler returned normally
    Completed,
    /// Retries exhausted or failure was not retryable
    Failed,
}

impl TaskStatus {
    /// No transition leaves a terminal status
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Running => write!(f, "running"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "running" => Ok(Self::Running),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(format!("Unknown task status: {}", s)),
        }
    }
}

/// A unit of work tracked by the scheduler
#[derive(Debug, Clone)]
pub struct Task {
    /// Unique identifier, stable across retries
    pub id: TaskId,

    /// Handler name, resolved against the registry at dispatch time
    pub name: String,

    /// Current priority (lower value = more urgent)
    pub priority: u32,

    /// Priority at submission
    pub original_priority: u32,

    /// Submission order, the final dispatch tie-breaker
    pub seq: u64,

    /// Not eligible for dispatch before this instant
    pub scheduled_at: Instant,

    /// When the task was submitted
    pub created_at: Instant,

    /// Wall-clock submission time
    pub submitted_at: DateTime<Utc>,

    /// Start of the latest attempt
    pub started_at: Option<Instant>,

    /// End of the final attempt
    pub completed_at: Option<Instant>,

    /// Current status
    pub status: TaskStatus,

    /// Failed attempts that consumed retry budget
    pub retries: u32,

    /// Retry cap, fixed at creation
    pub max_retries: u32,

    /// Number of dispatches so far
    pub attempts: u32,

    /// Worker that ran the latest attempt
    pub worker_id: Option<usize>,

    /// Output of the successful attempt
    pub result: Option<String>,

    /// Error from the latest failed attempt
    pub error: Option<String>,
}

impl Task {
    /// Create a pending task
    pub fn new(
        id: TaskId,
        name: impl Into<String>,
        priority: u32,
        seq: u64,
        scheduled_at: Instant,
        max_retries: u32,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            priority,
            original_priority: priority,
            seq,
            scheduled_at,
            created_at: Instant::now(),
            submitted_at: Utc::now(),
            started_at: None,
            completed_at: None,
            status: TaskStatus::Pending,
            retries: 0,
            max_retries,
            attempts: 0,
            worker_id: None,
            result: None,
            error: None,
        }
    }

    /// Whether the scheduled time has arrived
    pub fn is_eligible(&self, now: Instant) -> bool {
        self.scheduled_at <= now
    }

    /// `Pending -> Running`
    pub(crate) fn begin_attempt(&mut self, worker_id: usize, now: Instant) {
        debug_assert_eq!(self.status, TaskStatus::Pending);
        self.status = TaskStatus::Running;
        self.started_at = Some(now.max(self.created_at));
        self.worker_id = Some(worker_id);
        self.attempts += 1;
    }

    /// `Running -> Completed`
    pub(crate) fn complete(&mut self, result: String, now: Instant) {
        debug_assert_eq!(self.status, TaskStatus::Running);
        self.status = TaskStatus::Completed;
        self.completed_at = Some(self.clamp_end(now));
        self.result = Some(result);
        self.error = None;
    }

    /// `Running -> Pending` with the decayed priority
    pub(crate) fn requeue(&mut self, priority: u32, error: String) {
        debug_assert_eq!(self.status, TaskStatus::Running);
        debug_assert!(priority <= self.priority);
        self.status = TaskStatus::Pending;
        self.priority = priority;
        self.retries += 1;
        self.error = Some(error);
    }

    /// `Running -> Failed`
    pub(crate) fn fail(&mut self, error: String, now: Instant) {
        debug_assert_eq!(self.status, TaskStatus::Running);
        self.status = TaskStatus::Failed;
        self.completed_at = Some(self.clamp_end(now));
        self.result = None;
        self.error = Some(error);
    }

    fn clamp_end(&self, now: Instant) -> Instant {
        match self.started_at {
            Some(started) => now.max(started),
            None => now,
        }
    }

    /// Wall time of the final attempt
    pub fn duration(&self) -> Option<Duration> {
        match (self.started_at, self.completed_at) {
            (Some(started), Some(completed)) => Some(completed - started),
            _ => None,
        }
    }

    /// Serializable snapshot for reporting
    pub fn summary(&self) -> TaskSummary {
        TaskSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            priority: self.priority,
            original_priority: self.original_priority,
            status: self.status,
            retries: self.retries,
            attempts: self.attempts,
            worker_id: self.worker_id,
            duration_ms: self.duration().map(|d| d.as_millis() as u64),
            submitted_at: self.submitted_at,
            result: self.result.clone(),
            error: self.error.clone(),
        }
    }
}

/// Reporting view of a task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSummary {
    pub id: TaskId,
    pub name: String,
    pub priority: u32,
    pub original_priority: u32,
    pub status: TaskStatus,
    pub retries: u32,
    pub attempts: u32,
    pub worker_id: Option<usize>,
    pub duration_ms: Option<u64>,
    pub submitted_at: DateTime<Utc>,
    pub result: Option<String>,
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(priority: u32) -> Task {
        Task::new(TaskId::new(1), "echo", priority, 1, Instant::now(), 3)
    }

    #[test]
    fn test_new_task_defaults() {
        let task = pending(5);
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.priority, 5);
        assert_eq!(task.original_priority, 5);
        assert_eq!(task.retries, 0);
        assert_eq!(task.attempts, 0);
        assert!(task.started_at.is_none());
        assert!(task.result.is_none() && task.error.is_none());
    }

    #[test]
    fn test_eligibility() {
        let now = Instant::now();
        let mut task = pending(1);
        task.scheduled_at = now + Duration::from_secs(2);

        assert!(!task.is_eligible(now));
        assert!(task.is_eligible(now + Duration::from_secs(2)));
    }

    #[test]
    fn test_complete_lifecycle() {
        let mut task = pending(1);
        let now = Instant::now();
        task.begin_attempt(0, now);
        assert_eq!(task.status, TaskStatus::Running);
        assert_eq!(task.worker_id, Some(0));
        assert_eq!(task.attempts, 1);

        task.complete("ok".to_string(), now + Duration::from_millis(10));
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.result.as_deref(), Some("ok"));
        assert!(task.error.is_none());
        assert_eq!(task.duration(), Some(Duration::from_millis(10)));

        let created = task.created_at;
        let started = task.started_at.unwrap();
        let completed = task.completed_at.unwrap();
        assert!(created <= started && started <= completed);
    }

    #[test]
    fn test_requeue_then_fail() {
        let mut task = pending(3);
        task.begin_attempt(1, Instant::now());
        task.requeue(2, "boom".to_string());
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.priority, 2);
        assert_eq!(task.original_priority, 3);
        assert_eq!(task.retries, 1);

        task.begin_attempt(2, Instant::now());
        task.fail("boom again".to_string(), Instant::now());
        assert_eq!(task.status, TaskStatus::Failed);
        assert!(task.status.is_terminal());
        assert!(task.result.is_none());
        assert_eq!(task.error.as_deref(), Some("boom again"));
        assert_eq!(task.attempts, 2);
    }

    #[test]
    fn test_summary() {
        let mut task = pending(4);
        task.begin_attempt(2, Instant::now());
        task.complete("done".to_string(), Instant::now());

        let summary = task.summary();
        assert_eq!(summary.id, task.id);
        assert_eq!(summary.status, TaskStatus::Completed);
        assert_eq!(summary.worker_id, Some(2));
        assert!(summary.duration_ms.is_some());

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["status"], "completed");
        assert_eq!(json["name"], "echo");
    }

    #[test]
    fn test_status_parse_and_display() {
        assert_eq!("RUNNING".parse::<TaskStatus>().unwrap(), TaskStatus::Running);
        assert_eq!(TaskStatus::Failed.to_string(), "failed");
        assert!("stopped".parse::<TaskStatus>().is_err());
        assert!(!TaskStatus::Pending.is_terminal());
    }
}
