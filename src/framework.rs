//! Channel and framework lookup.

use crate::error::ApiError;
use crate::key_value_store::CacheStrategy;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub mod channel_handler;
pub mod service;

pub use channel_handler::GetChannelDetailsHandler;
pub use service::PreferenceFrameworkService;

/// A framework reference inside a channel record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Framework {
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Display position; absent or zero sorts after every positioned framework.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Channel configuration record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_framework: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frameworks: Option<Vec<Framework>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelDetailsRequest {
    pub channel_id: String,
    pub from: CacheStrategy,
}

/// Tracks the channel the active profile belongs to.
#[async_trait]
pub trait FrameworkService: Send + Sync {
    async fn set_active_channel_id(&self, channel_id: &str) -> Result<(), ApiError>;
    async fn get_active_channel_id(&self) -> Result<Option<String>, ApiError>;
}

/// Order frameworks by `index`.
///
/// Frameworks without a usable index (missing or zero) come after every indexed one; the
/// sort is stable, so among themselves they keep their original order.
pub fn sort_frameworks(frameworks: &mut [Framework]) {
    frameworks.sort_by_key(|f| match f.index.filter(|i| *i != 0) {
        Some(index) => (false, index),
        None => (true, 0),
    });
}
