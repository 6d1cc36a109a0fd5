//! taskpool - priority task scheduler
//!
//! CLI entry point for running the demo workload and inspecting configuration.

use std::fs;
use std::time::Duration;

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use tracing::{info, warn};

use taskpool::cli::{Cli, Command, OutputFormat, get_log_path};
use taskpool::config::Config;
use taskpool::demo;
use taskpool::handler::{BUILTIN_TASK_NAMES, builtin_registry};
use taskpool::scheduler::{Scheduler, SchedulerStats};

fn setup_logging(cli_level: Option<&str>, config_level: Option<&str>) -> Result<()> {
    // Create log directory
    let log_path = get_log_path();
    if let Some(log_dir) = log_path.parent() {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }

    // Priority: CLI flag > config file > INFO
    let level = match cli_level.or(config_level) {
        Some(s) => s
            .parse::<tracing::Level>()
            .map_err(|_| eyre::eyre!("Invalid log level '{}'", s))?,
        None => tracing::Level::INFO,
    };
    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {}, file: {})", level, log_path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging before loading config so the load itself is traced
    let config_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_level.as_deref()).context("Failed to setup logging")?;

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    info!(
        "taskpool loaded config: workers={}, max_retries={}",
        config.scheduler.worker_count, config.scheduler.max_retries
    );

    match cli.command {
        Command::Run {
            workers,
            tasks,
            duration,
            time_scale,
            failure_rate,
            format,
        } => {
            let mut config = config;
            if let Some(tasks) = tasks {
                config.demo.task_count = tasks;
            }
            if let Some(duration) = duration {
                config.demo.duration_secs = duration;
            }
            if let Some(time_scale) = time_scale {
                config.demo.time_scale = time_scale;
            }
            if let Some(failure_rate) = failure_rate {
                config.demo.failure_rate = failure_rate;
            }
            config.demo.validate().context("Invalid run options")?;
            let workers = workers.unwrap_or(config.scheduler.worker_count);
            cmd_run(&config, workers, format).await
        }
        Command::Handlers => cmd_handlers(),
        Command::Config => cmd_config(&config),
    }
}

/// Run the random demo workload
async fn cmd_run(config: &Config, workers: usize, format: OutputFormat) -> Result<()> {
    let registry = builtin_registry(config.demo.failure_rate, config.demo.time_scale);
    let scheduler = Scheduler::new(config.scheduler.clone(), registry);

    for request in demo::requests_for(&config.demo) {
        scheduler
            .submit_request(&request)
            .await
            .context(format!("Failed to submit {}", request.name))?;
    }
    info!(tasks = config.demo.task_count, workers, "Submitted demo workload");

    scheduler.start(workers).await.context("Failed to start scheduler")?;

    if format == OutputFormat::Text {
        println!(
            "Running {} tasks on {} workers for {}s...",
            config.demo.task_count.to_string().cyan(),
            workers.to_string().cyan(),
            config.demo.duration_secs
        );
    }

    tokio::select! {
        _ = tokio::time::sleep(Duration::from_secs(config.demo.duration_secs)) => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, stopping early");
        }
    }

    let drain = scheduler.stop(config.scheduler.shutdown_timeout()).await;
    if let Err(e) = &drain {
        warn!("{}", e);
    }

    let stats = scheduler.stats().await;
    info!(?stats, "Run finished");

    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "stats": stats,
                "drained": drain.is_ok(),
                "failed": scheduler.failed().await,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            if let Err(e) = &drain {
                println!("{} {}", "Warning:".yellow(), e);
            }
            print_stats(&stats);
            for task in scheduler.failed().await {
                println!(
                    "  {} {} ({}): {}",
                    "✗".red(),
                    task.name,
                    task.id,
                    task.error.unwrap_or_default()
                );
            }
        }
    }

    Ok(())
}

fn print_stats(stats: &SchedulerStats) {
    println!(
        "Scheduler completed: {} tasks, {} failed",
        stats.completed_count.to_string().green(),
        stats.failed_count.to_string().red()
    );
    println!("  Still queued: {} ({} delayed)", stats.queued, stats.delayed);
    println!("  Attempts:     {}", stats.total_attempts);
    println!("  Retries:      {}", stats.total_retries);
    println!("  Uptime:       {:.2}s", stats.uptime.as_secs_f64());
}

/// List builtin handler names
fn cmd_handlers() -> Result<()> {
    let mut names = BUILTIN_TASK_NAMES.to_vec();
    names.sort_unstable();
    for name in names {
        println!("{}", name);
    }
    Ok(())
}

/// Print the effective configuration
fn cmd_config(config: &Config) -> Result<()> {
    let yaml = serde_yaml::to_string(config).context("Failed to serialize config")?;
    print!("{}", yaml);
    Ok(())
}
