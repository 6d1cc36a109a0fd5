//! Scheduler configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Scheduler configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Workers spawned by `start` when no explicit count is given
    #[serde(rename = "worker-count", default = "default_worker_count")]
    pub worker_count: usize,

    /// Retry cap stamped on each new task
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Priority for submissions that don't name one
    #[serde(rename = "default-priority", default = "default_priority")]
    pub default_priority: u32,

    /// Completed tasks retained for inspection
    #[serde(rename = "completed-capacity", default = "default_completed_capacity")]
    pub completed_capacity: usize,

    /// Failed tasks retained for inspection
    #[serde(rename = "failed-capacity", default = "default_failed_capacity")]
    pub failed_capacity: usize,

    /// Longest an idle worker waits before re-checking the queue
    #[serde(rename = "idle-poll-ms", default = "default_idle_poll_ms")]
    pub idle_poll_ms: u64,

    /// How long `stop` waits for in-flight attempts by default
    #[serde(rename = "shutdown-timeout-ms", default = "default_shutdown_timeout_ms")]
    pub shutdown_timeout_ms: u64,
}

fn default_worker_count() -> usize {
    3
}

fn default_max_retries() -> u32 {
    3
}

fn default_priority() -> u32 {
    5
}

fn default_completed_capacity() -> usize {
    1000
}

fn default_failed_capacity() -> usize {
    500
}

fn default_idle_poll_ms() -> u64 {
    1000
}

fn default_shutdown_timeout_ms() -> u64 {
    2000
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            worker_count: 3,
            max_retries: 3,
            default_priority: 5,
            completed_capacity: 1000,
            failed_capacity: 500,
            idle_poll_ms: 1000,
            shutdown_timeout_ms: 2000,
        }
    }
}

impl SchedulerConfig {
    /// Get the idle poll interval as a Duration
    pub fn idle_poll(&self) -> Duration {
        Duration::from_millis(self.idle_poll_ms.max(1))
    }

    /// Get the default shutdown timeout as a Duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}
