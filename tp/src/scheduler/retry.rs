//! Retry policy
//!
//! A failed attempt is requeued while retry budget remains, one priority
//! step more urgent each time (floor 1). There is no time-based backoff: a
//! retried task keeps its original scheduled time and competes on priority.

use crate::handler::HandlerError;

/// Whether a failure can be retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Handler failed or panicked; may succeed next time
    Transient,
    /// Handler declared the failure permanent, or no handler exists
    Permanent,
}

impl From<&HandlerError> for FailureKind {
    fn from(err: &HandlerError) -> Self {
        if err.is_permanent() {
            FailureKind::Permanent
        } else {
            FailureKind::Transient
        }
    }
}

/// What to do with a failed task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Put it back in the queue at this priority
    Requeue { priority: u32 },
    /// Record it as permanently failed
    PermanentFail,
}

/// Priority for the next attempt: one step more urgent, never below 1
pub fn decayed_priority(priority: u32) -> u32 {
    priority.saturating_sub(1).max(1)
}

/// Decide the fate of a task whose attempt just failed
///
/// `retries` is the count before this failure. With `max_retries = 3` a task
/// that keeps failing runs four times: the first attempt plus three retries.
pub fn decide(retries: u32, max_retries: u32, kind: FailureKind, priority: u32) -> RetryDecision {
    match kind {
        FailureKind::Permanent => RetryDecision::PermanentFail,
        FailureKind::Transient if retries < max_retries => RetryDecision::Requeue {
            priority: decayed_priority(priority),
        },
        FailureKind::Transient => RetryDecision::PermanentFail,
    }
}
