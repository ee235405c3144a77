//! CLI parse: clap types for coursekit. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// coursekit - client-side learning SDK tools
#[derive(Parser)]
#[command(name = "coursekit")]
#[command(about = "Channel lookup, course progress summarization and profile import checks")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Look up a channel and its frameworks
    Channel {
        /// Channel identifier
        channel_id: String,
        /// Lookup strategy (server or cache)
        #[arg(long, default_value = "cache")]
        from: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Feed newline-delimited telemetry events through the summary handler
    Ingest {
        /// File with one JSON telemetry event per line
        path: PathBuf,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Course context operations
    Context {
        #[command(subcommand)]
        command: ContextCommands,
    },
    /// Check that an exported store contains user profiles
    ValidateExport {
        /// Path of the exported store
        path: PathBuf,
    },
    /// Configuration operations
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ContextCommands {
    /// Show the persisted course context
    Show {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Clear the persisted course context
    Clear,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration as TOML
    Show,
}
