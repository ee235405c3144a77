//! Channel detail lookup through the read-through cache.

use crate::api::{ApiRequestHandler, ApiService, Request};
use crate::config::FrameworkServiceConfig;
use crate::error::ApiError;
use crate::file::AssetReader;
use crate::framework::{sort_frameworks, Channel, ChannelDetailsRequest};
use crate::key_value_store::cached_item_store::CacheKey;
use crate::key_value_store::CachedItemStore;
use async_trait::async_trait;
use futures::FutureExt;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

const CHANNEL_FILE_KEY_PREFIX: &str = "channel-";
const CHANNEL_LOCAL_KEY: &str = "channel-";
const CHANNEL_TTL_KEY: &str = "ttl_channel-";
const GET_CHANNEL_DETAILS_ENDPOINT: &str = "/read";

pub struct GetChannelDetailsHandler {
    api_service: Arc<dyn ApiService>,
    config: FrameworkServiceConfig,
    asset_reader: Arc<dyn AssetReader>,
    cached_item_store: Arc<CachedItemStore>,
}

impl GetChannelDetailsHandler {
    pub fn new(
        api_service: Arc<dyn ApiService>,
        config: FrameworkServiceConfig,
        asset_reader: Arc<dyn AssetReader>,
        cached_item_store: Arc<CachedItemStore>,
    ) -> Self {
        Self {
            api_service,
            config,
            asset_reader,
            cached_item_store,
        }
    }

    async fn fetch_from_server(&self, channel_id: &str) -> Result<Channel, ApiError> {
        let request = Request::get(format!(
            "{}{}/{}",
            self.config.channel_api_path, GET_CHANNEL_DETAILS_ENDPOINT, channel_id
        ))
        .with_api_token(true);
        let response = self.api_service.fetch(request).await?;
        response.result_field("channel")
    }

    async fn fetch_from_file(&self, channel_id: &str) -> Result<Channel, ApiError> {
        let file = format!(
            "{}/{}{}.json",
            self.config.channel_config_dir_path.trim_end_matches('/'),
            CHANNEL_FILE_KEY_PREFIX,
            channel_id
        );
        let contents = self.asset_reader.read_asset(&file).await?;
        let envelope: Value = serde_json::from_str(&contents)?;
        let channel = envelope
            .pointer("/result/channel")
            .cloned()
            .ok_or_else(|| ApiError::InvalidData(format!("{} has no result.channel", file)))?;
        Ok(serde_json::from_value(channel)?)
    }
}

#[async_trait]
impl ApiRequestHandler<ChannelDetailsRequest, Channel> for GetChannelDetailsHandler {
    async fn handle(&self, request: ChannelDetailsRequest) -> Result<Channel, ApiError> {
        debug!(channel_id = %request.channel_id, from = ?request.from, "channel details lookup");
        let key = CacheKey {
            id: &request.channel_id,
            key_prefix: CHANNEL_LOCAL_KEY,
            ttl_prefix: CHANNEL_TTL_KEY,
        };
        let mut channel = self
            .cached_item_store
            .get(
                key,
                request.from,
                self.fetch_from_server(&request.channel_id).boxed(),
                Some(self.fetch_from_file(&request.channel_id).boxed()),
            )
            .await?;

        if let Some(frameworks) = channel.frameworks.as_mut() {
            sort_frameworks(frameworks);
        }
        Ok(channel)
    }
}
