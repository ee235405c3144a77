//! coursekit: client-side learning SDK
//!
//! Request/response handlers that sit between a remote learning-platform API, a local
//! sled store and an in-process event bus: channel lookup through a read-through cache,
//! telemetry-driven course progress, and managed profiles.

pub mod api;
pub mod cli;
pub mod config;
pub mod content;
pub mod course;
pub mod error;
pub mod events_bus;
pub mod file;
pub mod framework;
pub mod key_value_store;
pub mod logging;
pub mod preferences;
pub mod profile;
pub mod store;
pub mod summarizer;
pub mod telemetry;
