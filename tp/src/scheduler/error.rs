//! Scheduler error types

use std::time::Duration;
use thiserror::Error;

/// Errors returned by the scheduler's own API
///
/// Task failures never show up here; they are recorded on the task.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    #[error("Invalid priority {0}: must be >= 1")]
    InvalidPriority(i64),

    #[error("Invalid delay {0}s: must be a finite, non-negative number of seconds")]
    InvalidDelay(String),

    #[error("Task name must not be empty")]
    EmptyName,

    #[error("Invalid worker count {0}: must be >= 1")]
    InvalidWorkerCount(usize),

    #[error("Drain incomplete after {timeout:?}: {in_flight} attempt(s) still running")]
    DrainIncomplete { timeout: Duration, in_flight: usize },

    #[error("Previous worker pool still draining: {in_flight} attempt(s) running, call stop first")]
    StillDraining { in_flight: usize },
}

impl SchedulerError {
    /// Check if this is a shutdown timeout rather than a rejected call
    pub fn is_drain_incomplete(&self) -> bool {
        matches!(self, SchedulerError::DrainIncomplete { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_priority_message() {
        let msg = SchedulerError::InvalidPriority(0).to_string();
        assert!(msg.contains("0"));
        assert!(msg.contains(">= 1"));
    }

    #[test]
    fn test_drain_incomplete() {
        let err = SchedulerError::DrainIncomplete {
            timeout: Duration::from_millis(500),
            in_flight: 2,
        };
        assert!(err.is_drain_incomplete());
        assert!(err.to_string().contains("2 attempt(s)"));
        assert!(!SchedulerError::EmptyName.is_drain_incomplete());
    }

    #[test]
    fn test_still_draining_message() {
        let msg = SchedulerError::StillDraining { in_flight: 1 }.to_string();
        assert!(msg.contains("1 attempt(s)"));
        assert!(msg.contains("stop"));
    }
}
