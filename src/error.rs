//! Error types for the coursekit SDK.

use std::path::PathBuf;
use thiserror::Error;

/// Storage-related errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("Storage I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Errors surfaced by request handlers and collaborator services.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No active session available")]
    NoActiveSession,

    #[error("No profile found: {0}")]
    NoProfileFound(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Request failed with status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Asset not found: {0}")]
    AssetNotFound(PathBuf),

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::InvalidData(err.to_string())
    }
}
