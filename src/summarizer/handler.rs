//! Telemetry-driven course progress.
//!
//! Each event is classified into one route and processed as a sequential pipeline of
//! fallible steps. A failed step ends the pipeline; steps already applied are kept.

use crate::api::ApiRequestHandler;
use crate::config::SummarizerConfig;
use crate::content::{ContentDetailRequest, ContentMarkerRequest, ContentService, MarkerType};
use crate::course::{
    last_read_content_key, ContentStatus, CourseContext, CourseService, GetContentStateRequest,
    UpdateContentStateRequest,
};
use crate::error::ApiError;
use crate::events_bus::{BusEvent, EventsBusService};
use crate::preferences::{ContentKeys, SharedPreferences};
use crate::profile::{ContentAccess, ContentAccessService, ContentAccessStatus};
use crate::summarizer::{is_valid_completion, SummarizerService};
use crate::telemetry::{Eid, Telemetry};
use async_trait::async_trait;
use serde_json::Map;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, trace};

/// Marker contained in the producer id of events emitted by the content player.
pub const CONTENT_PLAYER_PID: &str = "contentplayer";

const ATTEMPT_ID_CDATA_TYPE: &str = "AttemptId";
const COURSE_OBJECT_TYPE: &str = "course";

const STARTED_PROGRESS: i32 = 5;
const COMPLETED_PROGRESS: i32 = 100;

/// Cross-event state for one logical session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummarySession {
    /// Actor of the last content-player START, until a matching ASSESS consumes it
    pub current_uid: Option<String>,
    pub current_content_id: Option<String>,
    /// In-memory mirror of the persisted course context
    pub course_context: CourseContext,
}

/// Collaborators the handler drives.
#[derive(Clone)]
pub struct HandlerDeps {
    pub course_service: Arc<dyn CourseService>,
    pub preferences: Arc<dyn SharedPreferences>,
    pub summarizer: Arc<dyn SummarizerService>,
    pub events_bus: Arc<dyn EventsBusService>,
    pub content_service: Arc<dyn ContentService>,
    pub content_access: Arc<dyn ContentAccessService>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Route {
    ContentOpen,
    CourseStart,
    ContentAssess,
    ContentEnd,
    CourseEnd,
    Ignore,
}

fn is_content_player(event: &Telemetry) -> bool {
    event
        .producer_id()
        .is_some_and(|pid| pid.contains(CONTENT_PLAYER_PID))
}

fn is_course(event: &Telemetry) -> bool {
    event
        .object_type()
        .is_some_and(|t| t.eq_ignore_ascii_case(COURSE_OBJECT_TYPE))
}

/// First matching route wins.
pub(crate) fn route(event: &Telemetry) -> Route {
    match event.eid {
        Eid::Start if is_content_player(event) => Route::ContentOpen,
        Eid::Start if is_course(event) => Route::CourseStart,
        Eid::Assess if is_content_player(event) => Route::ContentAssess,
        Eid::End if is_content_player(event) => Route::ContentEnd,
        Eid::End if is_course(event) => Route::CourseEnd,
        _ => Route::Ignore,
    }
}

fn require_content_id(event: &Telemetry) -> Result<&str, ApiError> {
    event.object_id().ok_or_else(|| {
        ApiError::InvalidData(format!("content player {} event has no object id", event.eid))
    })
}

pub struct SummaryTelemetryEventHandler {
    deps: HandlerDeps,
    end_event_validation_delay: Duration,
    session: Mutex<SummarySession>,
}

impl SummaryTelemetryEventHandler {
    pub fn new(deps: HandlerDeps, config: &SummarizerConfig) -> Self {
        Self::with_delay(deps, config.end_event_validation_delay())
    }

    pub fn with_delay(deps: HandlerDeps, end_event_validation_delay: Duration) -> Self {
        Self {
            deps,
            end_event_validation_delay,
            session: Mutex::new(SummarySession::default()),
        }
    }

    /// Copy of the session used by `handle`.
    pub async fn session(&self) -> SummarySession {
        self.session.lock().await.clone()
    }

    /// Process one event against explicit session state.
    pub async fn handle_in(
        &self,
        session: &mut SummarySession,
        event: &Telemetry,
    ) -> Result<(), ApiError> {
        let route = route(event);
        debug!(eid = %event.eid, actor = %event.actor.id, object = ?event.object_id(), ?route, "telemetry event");

        match route {
            Route::ContentOpen => self.on_content_open(session, event).await,
            Route::CourseStart => self.refresh_course_context(session).await,
            Route::ContentAssess => self.on_content_assess(session, event).await,
            Route::ContentEnd => self.on_content_end(session, event).await,
            Route::CourseEnd => self.clear_course_context(session).await,
            Route::Ignore => {
                trace!(eid = %event.eid, "event ignored");
                Ok(())
            }
        }
    }

    async fn on_content_open(
        &self,
        session: &mut SummarySession,
        event: &Telemetry,
    ) -> Result<(), ApiError> {
        let content_id = require_content_id(event)?;
        self.deps.course_service.reset_captured_assessment_events();
        session.current_uid = Some(event.actor.id.clone());
        session.current_content_id = Some(content_id.to_string());

        self.deps
            .summarizer
            .save_learner_assessment_details(event)
            .await?;
        self.refresh_course_context(session).await?;
        self.update_content_state(session, event, content_id).await?;
        self.mark_content_as_played(event, content_id).await
    }

    async fn on_content_assess(
        &self,
        session: &mut SummarySession,
        event: &Telemetry,
    ) -> Result<(), ApiError> {
        let content_id = require_content_id(event)?;
        self.consume_open_attempt(session, &event.actor.id, content_id)
            .await?;

        if event.has_cdata_type(ATTEMPT_ID_CDATA_TYPE) {
            let context = self.course_context(session).await?;
            if context.is_complete() {
                self.deps
                    .course_service
                    .capture_assessment_event(event, context);
            }
        }

        self.deps
            .summarizer
            .save_learner_assessment_details(event)
            .await?;
        Ok(())
    }

    async fn on_content_end(
        &self,
        session: &mut SummarySession,
        event: &Telemetry,
    ) -> Result<(), ApiError> {
        let content_id = require_content_id(event)?;
        self.deps
            .summarizer
            .save_learner_content_summary_details(event)
            .await?;
        self.refresh_course_context(session).await?;
        self.update_content_state(session, event, content_id).await
    }

    /// The first ASSESS after a START for the same user and content supersedes the
    /// records of earlier attempts.
    async fn consume_open_attempt(
        &self,
        session: &mut SummarySession,
        uid: &str,
        content_id: &str,
    ) -> Result<(), ApiError> {
        let (Some(current_uid), Some(current_content_id)) =
            (&session.current_uid, &session.current_content_id)
        else {
            return Ok(());
        };
        if current_uid.to_lowercase() != uid.to_lowercase()
            || current_content_id.to_lowercase() != content_id.to_lowercase()
        {
            return Ok(());
        }

        self.deps
            .summarizer
            .delete_previous_assessment_details(current_uid, current_content_id)
            .await?;
        session.current_uid = None;
        session.current_content_id = None;
        Ok(())
    }

    async fn refresh_course_context(&self, session: &mut SummarySession) -> Result<(), ApiError> {
        let raw = self
            .deps
            .preferences
            .get_string(ContentKeys::COURSE_CONTEXT)
            .await?;
        session.course_context = CourseContext::from_preference(raw.as_deref())?;
        Ok(())
    }

    /// Course context, reloaded from preferences only when the in-memory copy is empty.
    async fn course_context<'s>(
        &self,
        session: &'s mut SummarySession,
    ) -> Result<&'s CourseContext, ApiError> {
        if session.course_context.is_empty() {
            self.refresh_course_context(session).await?;
        }
        Ok(&session.course_context)
    }

    async fn clear_course_context(&self, session: &mut SummarySession) -> Result<(), ApiError> {
        session.course_context = CourseContext::default();
        self.deps
            .preferences
            .put_string(ContentKeys::COURSE_CONTEXT, "")
            .await?;
        info!("course context cleared");
        Ok(())
    }

    async fn update_content_state(
        &self,
        session: &SummarySession,
        event: &Telemetry,
        content_id: &str,
    ) -> Result<(), ApiError> {
        let context = &session.course_context;
        if !context.is_batch_in_progress() {
            debug!(batch_status = context.batch_status, "batch not in progress; content state untouched");
            return Ok(());
        }
        let user_id = context.user_id.as_deref().unwrap_or_default();
        let course_id = context.course_id.as_deref().unwrap_or_default();
        let batch_id = context.batch_id.as_deref().unwrap_or_default();

        let status = self
            .check_status_of_content(user_id, course_id, batch_id, content_id)
            .await?;
        let request = |status: i32, progress: i32| UpdateContentStateRequest {
            user_id: user_id.to_string(),
            content_id: content_id.to_string(),
            course_id: course_id.to_string(),
            batch_id: batch_id.to_string(),
            status,
            progress,
        };

        match event.eid {
            Eid::Start if status == ContentStatus::NOT_STARTED => {
                self.deps
                    .course_service
                    .update_content_state(request(ContentStatus::IN_PROGRESS, STARTED_PROGRESS))
                    .await?;
                info!(user_id, course_id, content_id, "content marked in progress");
            }
            Eid::End
                if status == ContentStatus::NOT_STARTED
                    || status == ContentStatus::IN_PROGRESS =>
            {
                if self.valid_end_event(event, content_id, context).await? {
                    self.deps
                        .course_service
                        .update_content_state(request(
                            ContentStatus::COMPLETED,
                            COMPLETED_PROGRESS,
                        ))
                        .await?;
                    info!(user_id, course_id, content_id, "content completed");
                    self.deps
                        .events_bus
                        .emit(BusEvent::course_state_updated(course_id));
                }
            }
            _ => {}
        }

        self.deps
            .preferences
            .put_string(
                &last_read_content_key(user_id, course_id, batch_id),
                content_id,
            )
            .await
    }

    async fn check_status_of_content(
        &self,
        user_id: &str,
        course_id: &str,
        batch_id: &str,
        content_id: &str,
    ) -> Result<i32, ApiError> {
        let response = self
            .deps
            .course_service
            .get_content_state(GetContentStateRequest {
                user_id: user_id.to_string(),
                batch_id: batch_id.to_string(),
                content_ids: vec![content_id.to_string()],
                course_ids: vec![course_id.to_string()],
            })
            .await?;
        Ok(response
            .map(|r| r.status_of(content_id))
            .unwrap_or(ContentStatus::NOT_STARTED))
    }

    async fn valid_end_event(
        &self,
        event: &Telemetry,
        content_id: &str,
        context: &CourseContext,
    ) -> Result<bool, ApiError> {
        let content = self
            .deps
            .content_service
            .get_content_details(ContentDetailRequest {
                content_id: content_id.to_string(),
            })
            .await?;
        if !self.end_event_validation_delay.is_zero() {
            tokio::time::sleep(self.end_event_validation_delay).await;
        }

        let captured = self.deps.course_service.has_captured_assessment_event(context);
        let valid = is_valid_completion(
            &content.mime_type,
            &content.content_type,
            captured,
            &event.edata.summary,
        );
        self.deps.course_service.reset_captured_assessment_events();
        debug!(
            content_id,
            mime_type = %content.mime_type,
            content_type = %content.content_type,
            captured,
            valid,
            "end event validated"
        );
        Ok(valid)
    }

    async fn mark_content_as_played(
        &self,
        event: &Telemetry,
        content_id: &str,
    ) -> Result<(), ApiError> {
        let content = self
            .deps
            .content_service
            .get_content_details(ContentDetailRequest {
                content_id: content_id.to_string(),
            })
            .await?;

        self.deps
            .content_access
            .add_content_access(ContentAccess {
                uid: event.actor.id.clone(),
                content_id: content_id.to_string(),
                content_type: content.content_type.clone(),
                status: ContentAccessStatus::Played,
                last_accessed_on: None,
            })
            .await?;

        self.deps
            .content_service
            .set_content_marker(ContentMarkerRequest {
                uid: event.actor.id.clone(),
                content_id: content_id.to_string(),
                data: serde_json::to_string(&content.content_data)?,
                marker: MarkerType::Previewed,
                is_marked: true,
                extra_info: Map::new(),
            })
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ApiRequestHandler<Telemetry, ()> for SummaryTelemetryEventHandler {
    async fn handle(&self, event: Telemetry) -> Result<(), ApiError> {
        let mut session = self.session.lock().await;
        self.handle_in(&mut session, &event).await
    }
}
