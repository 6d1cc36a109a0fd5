//! taskpool configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::scheduler::SchedulerConfig;

/// Main taskpool configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error)
    #[serde(rename = "log-level", skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// Scheduler settings
    pub scheduler: SchedulerConfig,

    /// Demo workload used by `tp run`
    pub demo: DemoConfig,
}

impl Config {
    /// Validate configuration before use
    pub fn validate(&self) -> Result<()> {
        if let Some(level) = &self.log_level {
            level
                .parse::<tracing::Level>()
                .map_err(|_| eyre::eyre!("Invalid log-level '{}'", level))?;
        }
        if self.scheduler.worker_count == 0 {
            return Err(eyre::eyre!("scheduler.worker-count must be >= 1"));
        }
        if self.scheduler.default_priority == 0 {
            return Err(eyre::eyre!("scheduler.default-priority must be >= 1"));
        }
        self.demo.validate()
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .taskpool.yml
        let local_config = PathBuf::from(".taskpool.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/taskpool/taskpool.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("taskpool").join("taskpool.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read just the log level, before logging is set up
    ///
    /// Errors are swallowed: a broken config file is reported properly by
    /// `load` once logging exists.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let candidates = match config_path {
            Some(path) => vec![path.clone()],
            None => {
                let mut paths = vec![PathBuf::from(".taskpool.yml")];
                if let Some(config_dir) = dirs::config_dir() {
                    paths.push(config_dir.join("taskpool").join("taskpool.yml"));
                }
                paths
            }
        };

        candidates
            .iter()
            .filter(|p| p.exists())
            .find_map(|p| Self::load_from_file(p).ok())
            .and_then(|config| config.log_level)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Random workload generated by `tp run`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Tasks to submit
    #[serde(rename = "task-count")]
    pub task_count: usize,

    /// Upper bound for each task's random delay
    #[serde(rename = "max-delay-secs")]
    pub max_delay_secs: f64,

    /// Priorities are drawn from 1..=max-priority
    #[serde(rename = "max-priority")]
    pub max_priority: u32,

    /// How long to let the pool run before stopping
    #[serde(rename = "duration-secs")]
    pub duration_secs: u64,

    /// Chance that a builtin handler attempt fails
    #[serde(rename = "failure-rate")]
    pub failure_rate: f64,

    /// Multiplier on builtin handler sleep times
    #[serde(rename = "time-scale")]
    pub time_scale: f64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            task_count: 200,
            max_delay_secs: 5.0,
            max_priority: 10,
            duration_secs: 10,
            failure_rate: 0.0,
            time_scale: 1.0,
        }
    }
}

impl DemoConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.failure_rate) {
            return Err(eyre::eyre!(
                "demo.failure-rate must be between 0 and 1, got {}",
                self.failure_rate
            ));
        }
        if !self.time_scale.is_finite() || self.time_scale < 0.0 {
            return Err(eyre::eyre!("demo.time-scale must be >= 0, got {}", self.time_scale));
        }
        if !self.max_delay_secs.is_finite() || self.max_delay_secs < 0.0 {
            return Err(eyre::eyre!(
                "demo.max-delay-secs must be >= 0, got {}",
                self.max_delay_secs
            ));
        }
        if self.max_priority == 0 {
            return Err(eyre::eyre!("demo.max-priority must be >= 1"));
        }
        Ok(())
    }
}
