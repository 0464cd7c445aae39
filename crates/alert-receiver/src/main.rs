//! Alert receiver CLI
//!
//! Runs the webhook server, or prints statistics from an existing history
//! file without starting it.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use alert_receiver::alerts::report::format_statistics_text;
use alert_receiver::alerts::store::{load_records, AlertStatistics};
use alert_receiver::alerts::{run_server, AppState};
use alert_receiver::config::{ReceiverConfig, DEFAULT_ADDR};
use alert_receiver::logging;

/// Alert webhook receiver with remediation playbooks and persistent history
#[derive(Parser)]
#[command(name = "alert-receiver")]
#[command(about = "Alert webhook receiver with remediation playbooks and persistent history")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Alert history file (overrides config)
    #[arg(long, env = "ALERT_RECEIVER_HISTORY_FILE", global = true)]
    history_file: Option<PathBuf>,

    /// Operator log file (overrides config)
    #[arg(long, env = "ALERT_RECEIVER_LOG_FILE", global = true)]
    log_file: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    Json,
    #[default]
    Text,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the webhook server
    Server {
        /// Address to bind to
        #[arg(long, env = "ALERT_RECEIVER_ADDR", default_value = DEFAULT_ADDR)]
        addr: String,

        /// Path to receiver config file (JSON)
        #[arg(long, env = "ALERT_RECEIVER_CONFIG")]
        config: Option<PathBuf>,
    },
    /// Print statistics from the history file
    Stats {
        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Path to receiver config file (JSON)
        #[arg(long, env = "ALERT_RECEIVER_CONFIG")]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Server { addr, config } => {
            let config = ReceiverConfig::load(config.as_deref())?
                .with_overrides(cli.history_file, cli.log_file);
            logging::init(&config.log_file, cli.verbose);
            run_server_command(&addr, &config).await?;
        }
        Commands::Stats { format, config } => {
            let config = ReceiverConfig::load(config.as_deref())?
                .with_overrides(cli.history_file, cli.log_file);
            if cli.verbose {
                tracing_subscriber::fmt()
                    .with_env_filter(logging::default_filter(true))
                    .init();
            }
            run_stats_command(&config.history_file, config.recent_window, format)?;
        }
    }

    Ok(())
}

/// Run the webhook server.
async fn run_server_command(addr: &str, config: &ReceiverConfig) -> Result<()> {
    println!("{}", "═".repeat(60).cyan());
    println!("{}", "ALERT RECEIVER".cyan().bold());
    println!("{}", "═".repeat(60).cyan());
    println!();
    println!("  Address:       {}", addr.green());
    println!(
        "  History file:  {}",
        config.history_file.display().to_string().green()
    );
    println!(
        "  Log file:      {}",
        config.log_file.display().to_string().green()
    );
    println!("  Rules:         {}", config.rules.len());
    println!("  History limit: {}", config.default_history_limit);
    println!();

    let state = Arc::new(AppState::from_config(config));
    println!(
        "  Loaded {} alerts from history",
        state.processor.store().len().await
    );
    println!();

    println!("{}", format!("Starting server on {addr}...").cyan());
    run_server(state, addr).await?;

    Ok(())
}

/// Print statistics for a history file.
fn run_stats_command(history_file: &Path, recent_window: usize, format: OutputFormat) -> Result<()> {
    let records = load_records(history_file)
        .with_context(|| format!("Failed to read alert history {}", history_file.display()))?;
    let stats = AlertStatistics::from_records(&records, recent_window);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
        OutputFormat::Text => {
            println!("{}", format_statistics_text(&stats));
            if stats.total == 0 {
                println!();
                println!("{}", "No alerts recorded yet.".yellow());
            }
        }
    }

    Ok(())
}
