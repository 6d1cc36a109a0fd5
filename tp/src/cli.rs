//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// taskpool - priority task scheduler with a bounded worker pool
#[derive(Parser)]
#[command(
    name = "tp",
    about = "Priority task scheduler with delayed dispatch and bounded retry",
    version,
    after_help = "Logs are written to: ~/.local/share/taskpool/logs/taskpool.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, help = "Log level (trace, debug, info, warn, error)")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Subcommand)]
pub enum Command {
    /// Run the random demo workload through the scheduler
    Run {
        /// Worker count (default from config)
        #[arg(short, long)]
        workers: Option<usize>,

        /// Tasks to submit (default from config)
        #[arg(short, long)]
        tasks: Option<usize>,

        /// Seconds to run before stopping (default from config)
        #[arg(short, long)]
        duration: Option<u64>,

        /// Multiplier on simulated handler sleep times
        #[arg(long)]
        time_scale: Option<f64>,

        /// Chance that a simulated attempt fails (0.0 to 1.0)
        #[arg(long)]
        failure_rate: Option<f64>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// List builtin handler names
    Handlers,

    /// Print the effective configuration as YAML
    Config,
}

/// Output format for run results
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use: text or json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Get the log file path
pub fn get_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("taskpool")
        .join("logs")
        .join("taskpool.log")
}
