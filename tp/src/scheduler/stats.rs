//! Point-in-time scheduler statistics

use std::time::Duration;

use serde::{Serialize, Serializer};

/// Snapshot returned by `Scheduler::stats`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SchedulerStats {
    /// Pending tasks, eligible or still delayed
    pub queued: usize,

    /// Pending tasks whose scheduled time has not arrived
    pub delayed: usize,

    /// Attempts in flight
    pub running: usize,

    /// Tasks completed since creation
    pub completed_count: u64,

    /// Tasks permanently failed since creation
    pub failed_count: u64,

    /// Live workers, including ones finishing an attempt after a timed-out stop
    pub worker_count: usize,

    /// Time since the pool was first started
    #[serde(rename = "uptime_secs", serialize_with = "as_secs_f64")]
    pub uptime: Duration,

    pub total_submitted: u64,
    pub total_attempts: u64,
    pub total_retries: u64,
}

fn as_secs_f64<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}
