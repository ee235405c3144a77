//! CLI domain: parse, route, help, output, and presentation only.
//! No domain orchestration; single route table dispatches to SDK services.

mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::command_name;
pub use output::map_error;
pub use parse::{Cli, Commands, ConfigCommands, ContextCommands};
pub use presentation::{
    format_channel_json, format_channel_text, format_context_json, format_context_text,
    format_import_validation, format_ingest_summary, IngestSummary,
};
pub use route::RunContext;
