//! Preference-backed active channel tracking.

use crate::error::ApiError;
use crate::framework::FrameworkService;
use crate::preferences::SharedPreferences;
use async_trait::async_trait;
use std::sync::Arc;

pub const ACTIVE_CHANNEL_ID_KEY: &str = "framework.active_channel_id";

pub struct PreferenceFrameworkService {
    preferences: Arc<dyn SharedPreferences>,
}

impl PreferenceFrameworkService {
    pub fn new(preferences: Arc<dyn SharedPreferences>) -> Self {
        Self { preferences }
    }
}

#[async_trait]
impl FrameworkService for PreferenceFrameworkService {
    async fn set_active_channel_id(&self, channel_id: &str) -> Result<(), ApiError> {
        self.preferences
            .put_string(ACTIVE_CHANNEL_ID_KEY, channel_id)
            .await
    }

    async fn get_active_channel_id(&self) -> Result<Option<String>, ApiError> {
        Ok(self
            .preferences
            .get_string(ACTIVE_CHANNEL_ID_KEY)
            .await?
            .filter(|id| !id.is_empty()))
    }
}
