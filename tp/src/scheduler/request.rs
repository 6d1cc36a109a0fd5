//! Submission requests from config files, the CLI, or other callers

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::SchedulerError;

/// A task submission in loosely-typed form
///
/// Fields are validated by [`TaskRequest::validate`]; out-of-range values are
/// rejected rather than clamped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRequest {
    /// Handler name
    pub name: String,

    /// Priority, lower is more urgent; falls back to the scheduler default
    #[serde(default)]
    pub priority: Option<i64>,

    /// Seconds to wait before the task becomes eligible
    #[serde(default, rename = "delay-secs")]
    pub delay_secs: f64,
}

/// A request that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidRequest {
    pub name: String,
    pub priority: u32,
    pub delay: Duration,
}

impl TaskRequest {
    /// Request with the default priority and no delay
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            priority: None,
            delay_secs: 0.0,
        }
    }

    /// Set the priority
    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Set the delay in seconds
    pub fn with_delay_secs(mut self, delay_secs: f64) -> Self {
        self.delay_secs = delay_secs;
        self
    }

    /// Check every field and convert to scheduler types
    pub fn validate(&self, default_priority: u32) -> Result<ValidRequest, SchedulerError> {
        if self.name.trim().is_empty() {
            return Err(SchedulerError::EmptyName);
        }

        let priority = match self.priority {
            Some(p) => validate_priority(p)?,
            None => validate_priority(default_priority as i64)?,
        };

        let delay = Duration::try_from_secs_f64(self.delay_secs)
            .map_err(|_| SchedulerError::InvalidDelay(self.delay_secs.to_string()))?;

        Ok(ValidRequest {
            name: self.name.clone(),
            priority,
            delay,
        })
    }
}

/// Priorities are integers >= 1
pub fn validate_priority(priority: i64) -> Result<u32, SchedulerError> {
    match u32::try_from(priority) {
        Ok(p) if p >= 1 => Ok(p),
        _ => Err(SchedulerError::InvalidPriority(priority)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied() {
        let valid = TaskRequest::new("echo").validate(5).unwrap();
        assert_eq!(valid.name, "echo");
        assert_eq!(valid.priority, 5);
        assert_eq!(valid.delay, Duration::ZERO);
    }

    #[test]
    fn test_explicit_values() {
        let valid = TaskRequest::new("echo")
            .with_priority(2)
            .with_delay_secs(1.5)
            .validate(5)
            .unwrap();
        assert_eq!(valid.priority, 2);
        assert_eq!(valid.delay, Duration::from_millis(1500));
    }

    #[test]
    fn test_rejects_non_positive_priority() {
        assert_eq!(
            TaskRequest::new("echo").with_priority(0).validate(5),
            Err(SchedulerError::InvalidPriority(0))
        );
        assert_eq!(
            TaskRequest::new("echo").with_priority(-3).validate(5),
            Err(SchedulerError::InvalidPriority(-3))
        );
        assert!(TaskRequest::new("echo").with_priority(i64::MAX).validate(5).is_err());
    }

    #[test]
    fn test_rejects_negative_or_nan_delay() {
        let err = TaskRequest::new("echo").with_delay_secs(-1.0).validate(5).unwrap_err();
        assert!(matches!(err, SchedulerError::InvalidDelay(_)));

        let err = TaskRequest::new("echo").with_delay_secs(f64::NAN).validate(5).unwrap_err();
        assert!(matches!(err, SchedulerError::InvalidDelay(_)));
    }

    #[test]
    fn test_rejects_empty_name() {
        assert_eq!(TaskRequest::new("  ").validate(5), Err(SchedulerError::EmptyName));
    }

    #[test]
    fn test_deserialize_yaml() {
        let yaml = "name: backup_database\npriority: 2\ndelay-secs: 0.5\n";
        let request: TaskRequest = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(request, TaskRequest::new("backup_database").with_priority(2).with_delay_secs(0.5));
    }
}
