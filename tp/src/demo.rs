//! Random demo workload for `tp run`

use rand::Rng;
use rand::seq::IndexedRandom;

use crate::config::DemoConfig;
use crate::handler::BUILTIN_TASK_NAMES;
use crate::scheduler::TaskRequest;

/// Draw `count` requests over the builtin task names
pub fn generate_requests(count: usize, max_delay_secs: f64, max_priority: u32) -> Vec<TaskRequest> {
    let mut rng = rand::rng();
    let max_priority = max_priority.max(1);
    let max_delay_secs = if max_delay_secs.is_finite() { max_delay_secs.max(0.0) } else { 0.0 };

    (0..count)
        .filter_map(|_| {
            let name = BUILTIN_TASK_NAMES.choose(&mut rng)?;
            Some(
                TaskRequest::new(*name)
                    .with_priority(rng.random_range(1..=max_priority) as i64)
                    .with_delay_secs(rng.random_range(0.0..=max_delay_secs)),
            )
        })
        .collect()
}

/// Workload described by a demo config
pub fn requests_for(config: &DemoConfig) -> Vec<TaskRequest> {
    generate_requests(config.task_count, config.max_delay_secs, config.max_priority)
}
