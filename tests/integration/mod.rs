//! Integration tests for coursekit

mod channel_cache;
mod cli_commands;
mod config_integration;
mod http_api;
mod summary_pipeline;
mod test_utils;
