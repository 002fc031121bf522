use clap::{Parser, Subcommand};
use std::path::PathBuf;

use smswatch::logstore::LogLevel;

#[derive(Parser, Debug)]
#[command(name = "smswatch")]
#[command(about = "Watch for text messages from one sender", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to $SMSWATCH_CONFIG or config/smswatch.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start a capture session fed by JSON lines on stdin
    Watch(WatchArgs),
    /// Inspect or reset the rolling log
    Logs {
        #[command(subcommand)]
        action: LogsAction,
    },
    /// Print the effective configuration
    Config,
}

#[derive(clap::Args, Debug)]
pub struct WatchArgs {
    /// Sender to watch for; overrides capture.target
    #[arg(long)]
    pub target: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum LogsAction {
    /// Print the full log
    Show,
    /// Print size and line count
    Stats,
    /// Delete the log file
    Clear,
    /// Append one entry
    Append {
        #[arg(long, default_value = "INFO")]
        level: LogLevel,
        #[arg(long, default_value = "cli")]
        tag: String,
        message: String,
    },
}
