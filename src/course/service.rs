//! Remote course-state service with an in-memory captured-assessment accumulator.

use crate::api::{ApiService, Request};
use crate::course::{
    ContentStateResponse, CourseContext, CourseService, GetContentStateRequest,
    UpdateContentStateRequest,
};
use crate::error::ApiError;
use crate::telemetry::Telemetry;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

const CONTENT_STATE_READ_ENDPOINT: &str = "/user/content/state/read";
const CONTENT_STATE_UPDATE_ENDPOINT: &str = "/user/content/state/update";

pub struct CourseServiceImpl {
    api_service: Arc<dyn ApiService>,
    course_api_path: String,
    captured_assessments: Mutex<HashMap<String, Vec<Telemetry>>>,
}

impl CourseServiceImpl {
    pub fn new(api_service: Arc<dyn ApiService>, course_api_path: impl Into<String>) -> Self {
        Self {
            api_service,
            course_api_path: course_api_path.into(),
            captured_assessments: Mutex::new(HashMap::new()),
        }
    }

    /// Number of captured events for a course attempt.
    pub fn captured_count(&self, context: &CourseContext) -> usize {
        self.captured_assessments
            .lock()
            .get(&context.attempt_key())
            .map(Vec::len)
            .unwrap_or(0)
    }
}

#[async_trait]
impl CourseService for CourseServiceImpl {
    async fn get_content_state(
        &self,
        request: GetContentStateRequest,
    ) -> Result<Option<ContentStateResponse>, ApiError> {
        let api_request = Request::post(format!(
            "{}{}",
            self.course_api_path, CONTENT_STATE_READ_ENDPOINT
        ))
        .with_api_token(true)
        .with_session_token(true)
        .with_body(json!({ "request": request }));

        let response = self.api_service.fetch(api_request).await?;
        match response.body.get("result") {
            Some(result) if !result.is_null() => Ok(Some(serde_json::from_value(result.clone())
                .map_err(|e| ApiError::InvalidResponse(format!("content state: {}", e)))?)),
            _ => Ok(None),
        }
    }

    async fn update_content_state(
        &self,
        request: UpdateContentStateRequest,
    ) -> Result<bool, ApiError> {
        let api_request = Request::patch(format!(
            "{}{}",
            self.course_api_path, CONTENT_STATE_UPDATE_ENDPOINT
        ))
        .with_api_token(true)
        .with_session_token(true)
        .with_body(json!({
            "request": {
                "userId": request.user_id,
                "contents": [{
                    "contentId": request.content_id,
                    "courseId": request.course_id,
                    "batchId": request.batch_id,
                    "status": request.status,
                    "progress": request.progress,
                }]
            }
        }));

        self.api_service.fetch(api_request).await?;
        Ok(true)
    }

    fn has_captured_assessment_event(&self, context: &CourseContext) -> bool {
        self.captured_assessments
            .lock()
            .get(&context.attempt_key())
            .is_some_and(|events| !events.is_empty())
    }

    fn capture_assessment_event(&self, event: &Telemetry, context: &CourseContext) {
        let key = context.attempt_key();
        debug!(attempt = %key, "captured assessment event");
        self.captured_assessments
            .lock()
            .entry(key)
            .or_default()
            .push(event.clone());
    }

    fn reset_captured_assessment_events(&self) {
        self.captured_assessments.lock().clear();
    }
}
