//! sled-backed summarizer records.
//!
//! Assessment records are keyed by (uid, content, seq) with a zero-padded sequence so a
//! prefix scan returns them in arrival order; content summaries are keyed by (uid, content).

use crate::error::ApiError;
use crate::store::{
    record_key, JsonTree, SdkStore, TREE_LEARNER_ASSESSMENTS, TREE_LEARNER_SUMMARIES,
};
use crate::summarizer::{LearnerAssessmentDetails, LearnerContentSummary, SummarizerService};
use crate::telemetry::{now_millis, Telemetry};
use async_trait::async_trait;
use tracing::debug;

pub struct SledSummarizerStore {
    assessments: JsonTree,
    summaries: JsonTree,
}

impl SledSummarizerStore {
    pub fn new(store: &SdkStore) -> Result<Self, ApiError> {
        Ok(Self {
            assessments: store.open_tree(TREE_LEARNER_ASSESSMENTS)?,
            summaries: store.open_tree(TREE_LEARNER_SUMMARIES)?,
        })
    }

    fn pair_prefix(uid: &str, content_id: &str) -> String {
        record_key(&[uid, content_id])
    }

    pub fn get_learner_assessment_details(
        &self,
        uid: &str,
        content_id: &str,
    ) -> Result<Vec<LearnerAssessmentDetails>, ApiError> {
        Ok(self
            .assessments
            .scan_prefix(&Self::pair_prefix(uid, content_id))?)
    }

    pub fn get_content_summary(
        &self,
        uid: &str,
        content_id: &str,
    ) -> Result<Option<LearnerContentSummary>, ApiError> {
        Ok(self.summaries.get(&Self::pair_prefix(uid, content_id))?)
    }
}

fn event_ids(event: &Telemetry) -> Result<(&str, &str), ApiError> {
    let content_id = event
        .object_id()
        .ok_or_else(|| ApiError::InvalidData(format!("{} event has no object id", event.eid)))?;
    Ok((event.actor.id.as_str(), content_id))
}

#[async_trait]
impl SummarizerService for SledSummarizerStore {
    async fn save_learner_assessment_details(&self, event: &Telemetry) -> Result<bool, ApiError> {
        let (uid, content_id) = event_ids(event)?;
        let seq = self.assessments.next_id()?;
        let record = LearnerAssessmentDetails {
            uid: uid.to_string(),
            content_id: content_id.to_string(),
            eid: event.eid.to_string(),
            ets: event.ets,
            edata: serde_json::to_value(&event.edata)?,
        };
        let seq = format!("{seq:020}");
        let key = record_key(&[uid, content_id, seq.as_str()]);
        self.assessments.put(&key, &record)?;
        Ok(true)
    }

    async fn save_learner_content_summary_details(
        &self,
        event: &Telemetry,
    ) -> Result<bool, ApiError> {
        let (uid, content_id) = event_ids(event)?;
        let progress = event
            .edata
            .summary
            .iter()
            .filter_map(|entry| entry.progress)
            .reduce(f64::max);
        let record = LearnerContentSummary {
            uid: uid.to_string(),
            content_id: content_id.to_string(),
            progress,
            ets: event.ets,
            updated_at: now_millis(),
        };
        self.summaries.put(&Self::pair_prefix(uid, content_id), &record)?;
        Ok(true)
    }

    async fn delete_previous_assessment_details(
        &self,
        uid: &str,
        content_id: &str,
    ) -> Result<bool, ApiError> {
        let removed = self
            .assessments
            .remove_prefix(&Self::pair_prefix(uid, content_id))?;
        debug!(uid, content_id, removed, "deleted previous assessment details");
        Ok(removed > 0)
    }
}
