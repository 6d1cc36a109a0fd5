//! taskpool - priority task scheduler with a bounded worker pool
//!
//! Callers submit named tasks with a priority and an optional delay. A fixed
//! pool of workers dispatches eligible tasks most-urgent first, and failed
//! attempts are retried a bounded number of times, each one a step more
//! urgent than the last.
//!
//! # Modules
//!
//! - [`scheduler`] - Queue, worker pool, retry policy and the [`Scheduler`] facade
//! - [`handler`] - Task handler trait, registry and builtin demo handlers
//! - [`domain`] - Task, TaskId and TaskStatus
//! - [`config`] - Configuration types and loading
//! - [`demo`] - Random workload for the `tp run` command
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod demo;
pub mod domain;
pub mod handler;
pub mod scheduler;

// Re-export commonly used types
pub use config::{Config, DemoConfig};
pub use domain::{Task, TaskId, TaskStatus, TaskSummary};
pub use handler::{FnHandler, HandlerError, HandlerRegistry, HandlerResult, TaskHandler, builtin_registry};
pub use scheduler::{Scheduler, SchedulerConfig, SchedulerError, SchedulerStats, TaskRequest};
