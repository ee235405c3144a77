//! Learning-progress summarization.
//!
//! `SummaryTelemetryEventHandler` consumes learner telemetry one event at a time and
//! drives course-state updates; `SummarizerService` persists the raw assessment and
//! content-summary records those events carry.

use crate::error::ApiError;
use crate::telemetry::Telemetry;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod completion;
pub mod handler;
pub mod store;

pub use completion::is_valid_completion;
pub use handler::{HandlerDeps, SummarySession, SummaryTelemetryEventHandler};
pub use store::SledSummarizerStore;

/// One persisted assessment-related event for a (user, content) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnerAssessmentDetails {
    pub uid: String,
    pub content_id: String,
    pub eid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ets: Option<u64>,
    #[serde(default)]
    pub edata: Value,
}

/// Latest playback summary for a (user, content) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnerContentSummary {
    pub uid: String,
    pub content_id: String,
    /// Highest progress sample reported by the END event
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ets: Option<u64>,
    pub updated_at: u64,
}

#[async_trait]
pub trait SummarizerService: Send + Sync {
    async fn save_learner_assessment_details(&self, event: &Telemetry) -> Result<bool, ApiError>;
    async fn save_learner_content_summary_details(
        &self,
        event: &Telemetry,
    ) -> Result<bool, ApiError>;
    /// Drop assessment records superseded by a new attempt.
    async fn delete_previous_assessment_details(
        &self,
        uid: &str,
        content_id: &str,
    ) -> Result<bool, ApiError>;
}
