//! End-to-end summary telemetry processing over sled-backed stores

use async_trait::async_trait;
use coursekit::api::{ApiRequestHandler, ApiService, HttpRequestType, Request, Response};
use coursekit::content::{HttpContentService, MarkerType};
use coursekit::course::{last_read_content_key, CourseContext, CourseServiceImpl};
use coursekit::error::ApiError;
use coursekit::events_bus::{BusEvent, EventsBus};
use coursekit::preferences::{ContentKeys, SharedPreferences, SledSharedPreferences};
use coursekit::profile::{ContentAccessService, ContentAccessStatus, SledContentAccessStore};
use coursekit::store::SdkStore;
use coursekit::summarizer::{HandlerDeps, SledSummarizerStore, SummaryTelemetryEventHandler};
use coursekit::telemetry::{Eid, SummaryEntry, Telemetry};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

/// Content and course-state endpoints backed by one in-memory status.
struct CourseBackend {
    status: Mutex<i32>,
    updates: Mutex<Vec<Value>>,
}

impl CourseBackend {
    fn new() -> Self {
        Self {
            status: Mutex::new(0),
            updates: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ApiService for CourseBackend {
    async fn fetch(&self, request: Request) -> Result<Response, ApiError> {
        let body = match (request.request_type, request.path.as_str()) {
            (HttpRequestType::Get, "/api/content/v1/read/c1") => json!({
                "result": { "content": {
                    "identifier": "c1",
                    "contentType": "Resource",
                    "mimeType": "video/mp4",
                    "contentData": { "name": "Intro video" }
                }}
            }),
            (HttpRequestType::Post, "/api/course/v1/user/content/state/read") => json!({
                "result": { "contentList": [{ "contentId": "c1", "status": *self.status.lock() }] }
            }),
            (HttpRequestType::Patch, "/api/course/v1/user/content/state/update") => {
                let contents = request
                    .body
                    .as_ref()
                    .and_then(|b| b.pointer("/request/contents/0"))
                    .cloned()
                    .unwrap_or(Value::Null);
                if let Some(status) = contents.get("status").and_then(Value::as_i64) {
                    *self.status.lock() = status as i32;
                }
                self.updates.lock().push(contents);
                json!({ "result": { "response": "SUCCESS" } })
            }
            (_, path) => {
                return Err(ApiError::HttpStatus {
                    status: 404,
                    body: format!("no route for {}", path),
                })
            }
        };
        Ok(Response { status: 200, body })
    }
}

fn player_event(eid: Eid) -> Telemetry {
    Telemetry::new(eid, "u1")
        .with_object("c1", Some("Content"))
        .with_pid("sunbird.app.contentplayer")
}

#[tokio::test]
async fn course_video_is_completed_and_context_cleared() {
    let store = SdkStore::temporary().unwrap();
    let backend = Arc::new(CourseBackend::new());
    let preferences = Arc::new(SledSharedPreferences::new(&store).unwrap());
    let summarizer = Arc::new(SledSummarizerStore::new(&store).unwrap());
    let content_access = Arc::new(SledContentAccessStore::new(&store).unwrap());
    let content_service =
        Arc::new(HttpContentService::new(backend.clone(), "/api/content/v1", &store).unwrap());
    let (bus, bus_events) = EventsBus::new_pair();

    preferences
        .put_string(
            ContentKeys::COURSE_CONTEXT,
            &serde_json::to_string(&CourseContext::new("u1", "co1", "b1", 1)).unwrap(),
        )
        .await
        .unwrap();

    let handler = SummaryTelemetryEventHandler::with_delay(
        HandlerDeps {
            course_service: Arc::new(CourseServiceImpl::new(backend.clone(), "/api/course/v1")),
            preferences: preferences.clone(),
            summarizer: summarizer.clone(),
            events_bus: Arc::new(bus),
            content_service: content_service.clone(),
            content_access: content_access.clone(),
        },
        Duration::ZERO,
    );

    handler.handle(player_event(Eid::Start)).await.unwrap();
    handler.handle(player_event(Eid::Assess)).await.unwrap();
    handler
        .handle(player_event(Eid::End).with_summary(vec![SummaryEntry::progress(25.0)]))
        .await
        .unwrap();

    let updates = backend.updates.lock().clone();
    assert_eq!(updates.len(), 2);
    assert_eq!(updates[0]["status"], json!(1));
    assert_eq!(updates[0]["progress"], json!(5));
    assert_eq!(updates[1]["status"], json!(2));
    assert_eq!(updates[1]["progress"], json!(100));
    assert_eq!(updates[1]["courseId"], json!("co1"));

    let accesses = content_access.get_content_accesses("u1").await.unwrap();
    assert_eq!(accesses.len(), 1);
    assert_eq!(accesses[0].status, ContentAccessStatus::Played);
    assert_eq!(accesses[0].content_type, "Resource");
    let marker = content_service
        .get_marker("u1", "c1", MarkerType::Previewed)
        .unwrap()
        .unwrap();
    assert!(marker.data.contains("Intro video"));

    // the first ASSESS after START superseded the START record
    let assessments = summarizer.get_learner_assessment_details("u1", "c1").unwrap();
    let eids: Vec<&str> = assessments.iter().map(|a| a.eid.as_str()).collect();
    assert_eq!(eids, vec!["ASSESS"]);
    let summary = summarizer.get_content_summary("u1", "c1").unwrap().unwrap();
    assert_eq!(summary.progress, Some(25.0));

    let published: Vec<BusEvent> = bus_events.try_iter().collect();
    assert_eq!(published, vec![BusEvent::course_state_updated("co1")]);
    assert_eq!(
        preferences
            .get_string(&last_read_content_key("u1", "co1", "b1"))
            .await
            .unwrap()
            .as_deref(),
        Some("c1")
    );

    let course_end = Telemetry::new(Eid::End, "u1").with_object("co1", Some("Course"));
    handler.handle(course_end).await.unwrap();
    assert_eq!(
        preferences
            .get_string(ContentKeys::COURSE_CONTEXT)
            .await
            .unwrap()
            .as_deref(),
        Some("")
    );
    assert!(handler.session().await.course_context.is_empty());
}

#[tokio::test]
async fn content_outside_an_active_batch_is_only_recorded_locally() {
    let store = SdkStore::temporary().unwrap();
    let backend = Arc::new(CourseBackend::new());
    let preferences = Arc::new(SledSharedPreferences::new(&store).unwrap());
    let summarizer = Arc::new(SledSummarizerStore::new(&store).unwrap());
    let content_access = Arc::new(SledContentAccessStore::new(&store).unwrap());
    let (bus, bus_events) = EventsBus::new_pair();

    let handler = SummaryTelemetryEventHandler::with_delay(
        HandlerDeps {
            course_service: Arc::new(CourseServiceImpl::new(backend.clone(), "/api/course/v1")),
            preferences,
            summarizer: summarizer.clone(),
            events_bus: Arc::new(bus),
            content_service: Arc::new(
                HttpContentService::new(backend.clone(), "/api/content/v1", &store).unwrap(),
            ),
            content_access: content_access.clone(),
        },
        Duration::ZERO,
    );

    handler.handle(player_event(Eid::Start)).await.unwrap();
    handler
        .handle(player_event(Eid::End).with_summary(vec![SummaryEntry::progress(100.0)]))
        .await
        .unwrap();

    assert!(backend.updates.lock().is_empty());
    assert!(bus_events.try_iter().next().is_none());
    assert_eq!(content_access.get_content_accesses("u1").await.unwrap().len(), 1);
    assert!(summarizer.get_content_summary("u1", "c1").unwrap().is_some());
}
