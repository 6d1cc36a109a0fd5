//! Priority task scheduler
//!
//! Accepts named tasks with a priority and optional delay, dispatches them to
//! a bounded worker pool in priority order once eligible, and retries failed
//! attempts with decaying priority.

mod config;
mod core;
mod error;
mod queue;
mod request;
pub mod retry;
mod ring;
mod stats;
mod worker;

pub use config::SchedulerConfig;
pub use core::Scheduler;
pub use error::SchedulerError;
pub use queue::{Dequeue, QueueEntry, TaskQueue};
pub use request::{TaskRequest, ValidRequest, validate_priority};
pub use retry::{FailureKind, RetryDecision};
pub use ring::RingBuffer;
pub use stats::SchedulerStats;
