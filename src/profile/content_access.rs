//! sled-backed content access records, one per (user, content).

use crate::error::ApiError;
use crate::profile::{ContentAccess, ContentAccessService};
use crate::store::{record_key, JsonTree, SdkStore, TREE_CONTENT_ACCESS};
use crate::telemetry::now_millis;
use async_trait::async_trait;

pub struct SledContentAccessStore {
    tree: JsonTree,
}

impl SledContentAccessStore {
    pub fn new(store: &SdkStore) -> Result<Self, ApiError> {
        Ok(Self {
            tree: store.open_tree(TREE_CONTENT_ACCESS)?,
        })
    }
}

#[async_trait]
impl ContentAccessService for SledContentAccessStore {
    async fn add_content_access(&self, mut access: ContentAccess) -> Result<bool, ApiError> {
        access.last_accessed_on = Some(now_millis());
        let key = record_key(&[access.uid.as_str(), access.content_id.as_str()]);
        self.tree.put(&key, &access)?;
        Ok(true)
    }

    async fn get_content_accesses(&self, uid: &str) -> Result<Vec<ContentAccess>, ApiError> {
        Ok(self.tree.scan_prefix(&record_key(&[uid]))?)
    }
}
