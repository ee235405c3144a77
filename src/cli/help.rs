//! CLI command-name contract for logging.

use crate::cli::parse::{Commands, ConfigCommands, ContextCommands};

/// Command name string (e.g. "channel", "context.show").
pub fn command_name(command: &Commands) -> String {
    match command {
        Commands::Channel { .. } => "channel".to_string(),
        Commands::Ingest { .. } => "ingest".to_string(),
        Commands::Context { command } => format!("context.{}", context_command_name(command)),
        Commands::ValidateExport { .. } => "validate_export".to_string(),
        Commands::Config { command } => format!("config.{}", config_command_name(command)),
    }
}

pub fn context_command_name(command: &ContextCommands) -> &'static str {
    match command {
        ContextCommands::Show { .. } => "show",
        ContextCommands::Clear => "clear",
    }
}

pub fn config_command_name(command: &ConfigCommands) -> &'static str {
    match command {
        ConfigCommands::Show => "show",
    }
}
