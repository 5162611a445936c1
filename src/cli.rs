use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "hostlink",
    version,
    about = "Bootstrap, inspect and smoke-test telemetry integrations"
)]
pub struct Cli {
    /// Directory holding the integration config files (defaults to the current directory).
    #[arg(long, global = true, value_name = "PATH")]
    pub dir: Option<PathBuf>,

    /// Also write daily-rotated JSON logs into this directory.
    #[arg(long, global = true, value_name = "PATH")]
    pub log_dir: Option<PathBuf>,

    /// Emit JSON log lines on stderr.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Write default config files for every backend that has none yet.
    Init,
    /// Attach every integration, report its state, then detach.
    Status,
    /// Write a checkpoint point to the metrics sink.
    Ping {
        /// Message stored in the ping point.
        message: String,
    },
    /// Ping the search node and wait for the answer.
    Probe,
}
