//! Course progress: course context, per-content completion state and the
//! captured-assessment accumulator for the active attempt.

use crate::error::ApiError;
use crate::telemetry::Telemetry;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub mod service;

pub use service::CourseServiceImpl;

/// Prefix of the preference key holding the last-read content of a course batch.
pub const LAST_READ_CONTENTID_PREFIX: &str = "lastReadContentId";

/// Batch status value under which content progress may be recorded.
pub const BATCH_IN_PROGRESS: i64 = 1;

/// Remote completion status of one content item inside a course batch.
pub struct ContentStatus;

impl ContentStatus {
    pub const NOT_STARTED: i32 = 0;
    pub const IN_PROGRESS: i32 = 1;
    pub const COMPLETED: i32 = 2;
}

/// The active user/course/batch association, stored as JSON in preferences.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<String>,
    #[serde(default)]
    pub batch_status: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CourseContext {
    pub fn new(
        user_id: impl Into<String>,
        course_id: impl Into<String>,
        batch_id: impl Into<String>,
        batch_status: i64,
    ) -> Self {
        Self {
            user_id: Some(user_id.into()),
            course_id: Some(course_id.into()),
            batch_id: Some(batch_id.into()),
            batch_status,
            extra: Map::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.user_id.is_none()
            && self.course_id.is_none()
            && self.batch_id.is_none()
            && self.batch_status == 0
            && self.extra.is_empty()
    }

    /// User, course and batch are all present and non-empty.
    pub fn is_complete(&self) -> bool {
        [&self.user_id, &self.course_id, &self.batch_id]
            .iter()
            .all(|field| field.as_deref().is_some_and(|v| !v.is_empty()))
    }

    pub fn is_batch_in_progress(&self) -> bool {
        self.batch_status == BATCH_IN_PROGRESS
    }

    /// Identity of the course attempt this context describes.
    pub fn attempt_key(&self) -> String {
        format!(
            "{}:{}:{}",
            self.user_id.as_deref().unwrap_or_default(),
            self.course_id.as_deref().unwrap_or_default(),
            self.batch_id.as_deref().unwrap_or_default()
        )
    }

    /// Parse the persisted form; empty means no active course.
    pub fn from_preference(raw: Option<&str>) -> Result<Self, ApiError> {
        match raw {
            Some(value) if !value.trim().is_empty() => Ok(serde_json::from_str(value)?),
            _ => Ok(Self::default()),
        }
    }
}

pub fn last_read_content_key(user_id: &str, course_id: &str, batch_id: &str) -> String {
    format!("{LAST_READ_CONTENTID_PREFIX}_{user_id}_{course_id}_{batch_id}")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetContentStateRequest {
    pub user_id: String,
    pub batch_id: String,
    pub content_ids: Vec<String>,
    pub course_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContentStateRequest {
    pub user_id: String,
    pub content_id: String,
    pub course_id: String,
    pub batch_id: String,
    pub status: i32,
    pub progress: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentState {
    pub content_id: String,
    #[serde(default)]
    pub status: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentStateResponse {
    #[serde(default)]
    pub content_list: Vec<ContentState>,
}

impl ContentStateResponse {
    /// Status of `content_id`; unknown or missing status counts as not started.
    pub fn status_of(&self, content_id: &str) -> i32 {
        self.content_list
            .iter()
            .find(|c| c.content_id == content_id)
            .and_then(|c| c.status)
            .unwrap_or(ContentStatus::NOT_STARTED)
    }
}

#[async_trait]
pub trait CourseService: Send + Sync {
    async fn get_content_state(
        &self,
        request: GetContentStateRequest,
    ) -> Result<Option<ContentStateResponse>, ApiError>;

    async fn update_content_state(
        &self,
        request: UpdateContentStateRequest,
    ) -> Result<bool, ApiError>;

    /// Whether an attempt-correlated ASSESS event was captured for this course context.
    fn has_captured_assessment_event(&self, context: &CourseContext) -> bool;

    fn capture_assessment_event(&self, event: &Telemetry, context: &CourseContext);

    fn reset_captured_assessment_events(&self);
}
