//! Importing profiles from an exported store.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;

pub mod validate_metadata;

pub use validate_metadata::ValidateProfileMetadata;

/// Import type a profile export must declare in its metadata.
pub const USER_PROFILE_IMPORT_TYPE: &str = "userprofile";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ImportFailed,
}

/// State threaded through the import steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportProfileContext {
    pub source_db_file_path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl ImportProfileContext {
    pub fn new(source_db_file_path: impl Into<PathBuf>) -> Self {
        Self {
            source_db_file_path: source_db_file_path.into(),
            ..Default::default()
        }
    }
}

/// Outcome of an import step: a body on success, an error code on a data-shape failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportResponse<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorCode>,
}

impl<T> ImportResponse<T> {
    pub fn ok(body: T) -> Self {
        Self {
            body: Some(body),
            error: None,
        }
    }

    pub fn failed(error: ErrorCode) -> Self {
        Self {
            body: None,
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}
