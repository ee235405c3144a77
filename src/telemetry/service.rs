//! Session telemetry sink.

use crate::error::ApiError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Session boundary emitted when the active profile changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTelemetry {
    pub uid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    #[serde(rename = "type")]
    pub session_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl SessionTelemetry {
    pub fn session(uid: impl Into<String>, sid: Option<String>) -> Self {
        Self {
            uid: uid.into(),
            sid,
            session_type: "session".to_string(),
            duration_ms: None,
        }
    }
}

/// Generates START/END telemetry for session lifecycles.
#[async_trait]
pub trait TelemetryService: Send + Sync {
    async fn start(&self, event: SessionTelemetry) -> Result<bool, ApiError>;
    async fn end(&self, event: SessionTelemetry) -> Result<bool, ApiError>;
}
