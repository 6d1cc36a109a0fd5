//! Builtin simulated handlers for the demo workload
//!
//! Each handler sleeps for a random duration in its profile's range and
//! reports a randomly sized amount of work done.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tracing::debug;

use crate::domain::Task;

use super::{HandlerError, HandlerRegistry, HandlerResult, TaskHandler};

/// Task names the builtin registry knows about
pub const BUILTIN_TASK_NAMES: [&str; 15] = [
    "backup_database",
    "cleanup_temp",
    "sync_repositories",
    "index_documents",
    "generate_reports",
    "send_notifications",
    "process_webhooks",
    "archive_logs",
    "update_search_index",
    "validate_schemas",
    "compress_assets",
    "scan_security",
    "optimize_images",
    "cache_warmup",
    "health_check",
];

/// Sleep range and result shape for one kind of simulated work
#[derive(Debug, Clone, Copy)]
struct Profile {
    min_secs: f64,
    max_secs: f64,
    label: &'static str,
    unit: &'static str,
    min_count: u32,
    max_count: u32,
}

const fn profile(
    min_secs: f64,
    max_secs: f64,
    label: &'static str,
    min_count: u32,
    max_count: u32,
    unit: &'static str,
) -> Profile {
    Profile {
        min_secs,
        max_secs,
        label,
        unit,
        min_count,
        max_count,
    }
}

const BACKUP: Profile = profile(0.5, 2.0, "Backup completed", 100, 1000, "MB");
const CLEANUP: Profile = profile(0.3, 1.0, "Cleaned", 10, 500, "files");
const SYNC: Profile = profile(0.8, 3.0, "Synced", 50, 5000, "objects");
const INDEX: Profile = profile(0.6, 2.5, "Indexed", 1000, 50000, "documents");
const GENERATE: Profile = profile(1.0, 4.0, "Generated", 1, 20, "reports");
const SEND: Profile = profile(0.2, 1.5, "Sent", 1, 100, "notifications");
const PROCESS: Profile = profile(0.4, 2.0, "Processed", 5, 500, "webhooks");
const ARCHIVE: Profile = profile(0.7, 2.8, "Archived", 50, 2000, "files");
const VALIDATE: Profile = profile(0.3, 1.2, "Validated", 5, 50, "schemas");
const COMPRESS: Profile = profile(0.9, 3.5, "Compressed", 20, 500, "assets");

// Names without a dedicated profile just report that they ran
const GENERIC_SECS: (f64, f64) = (0.1, 1.0);

fn profile_for(name: &str) -> Option<Profile> {
    match name {
        "backup_database" => Some(BACKUP),
        "cleanup_temp" => Some(CLEANUP),
        "sync_repositories" => Some(SYNC),
        "index_documents" | "update_search_index" => Some(INDEX),
        "generate_reports" => Some(GENERATE),
        "send_notifications" => Some(SEND),
        "process_webhooks" => Some(PROCESS),
        "archive_logs" => Some(ARCHIVE),
        "validate_schemas" => Some(VALIDATE),
        "compress_assets" => Some(COMPRESS),
        _ => None,
    }
}

/// Handler that simulates work by sleeping
#[derive(Debug, Clone)]
pub struct SimulatedHandler {
    profile: Option<Profile>,
    failure_rate: f64,
    time_scale: f64,
}

impl SimulatedHandler {
    /// Create the handler for a builtin task name
    pub fn for_name(name: &str, failure_rate: f64, time_scale: f64) -> Self {
        Self {
            profile: profile_for(name),
            failure_rate,
            time_scale,
        }
    }

    /// Pick the sleep and the outcome up front so the RNG is not held across an await
    fn plan(&self, task: &Task) -> (Duration, HandlerResult) {
        let mut rng = rand::rng();

        let (min_secs, max_secs) = match self.profile {
            Some(p) => (p.min_secs, p.max_secs),
            None => GENERIC_SECS,
        };
        let secs = rng.random_range(min_secs..=max_secs) * self.time_scale;
        let sleep = Duration::try_from_secs_f64(secs).unwrap_or_default();

        if rng.random::<f64>() < self.failure_rate {
            let error = format!("{} failed after {:.2}s", task.name, secs);
            return (sleep, Err(HandlerError::transient(error)));
        }

        let message = match self.profile {
            Some(p) => format!("{}: {} {}", p.label, rng.random_range(p.min_count..=p.max_count), p.unit),
            None => format!("Executed: {}", task.name),
        };
        (sleep, Ok(message))
    }
}

#[async_trait]
impl TaskHandler for SimulatedHandler {
    async fn execute(&self, task: Task) -> HandlerResult {
        let (sleep, outcome) = self.plan(&task);
        debug!(task_id = %task.id, name = %task.name, ?sleep, "SimulatedHandler::execute: sleeping");
        tokio::time::sleep(sleep).await;
        outcome
    }
}

/// Registry with a simulated handler for every builtin task name
pub fn builtin_registry(failure_rate: f64, time_scale: f64) -> HandlerRegistry {
    debug!(failure_rate, time_scale, "builtin_registry: called");
    let mut registry = HandlerRegistry::new();
    for name in BUILTIN_TASK_NAMES {
        registry.register(name, SimulatedHandler::for_name(name, failure_rate, time_scale));
    }
    registry
}
