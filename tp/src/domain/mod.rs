//! Domain types for taskpool
//!
//! Core domain types: Task, TaskId, TaskStatus

mod id;
mod task;

pub use id::{TaskId, generate_id};
pub use task::{Task, TaskStatus, TaskSummary};
