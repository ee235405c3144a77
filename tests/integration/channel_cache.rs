//! Channel lookup through the sled-backed read-through cache

use super::test_utils::{closed_base_url, serve_once};
use coursekit::api::{ApiRequestHandler, HttpApiService};
use coursekit::config::{ApiConfig, FrameworkServiceConfig};
use coursekit::error::ApiError;
use coursekit::file::FsAssetReader;
use coursekit::framework::{ChannelDetailsRequest, GetChannelDetailsHandler};
use coursekit::key_value_store::{CacheStrategy, CachedItemStore, SledKeyValueStore};
use coursekit::store::SdkStore;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn handler(base_url: String, store: &SdkStore, assets: &TempDir) -> GetChannelDetailsHandler {
    let api = HttpApiService::new(&ApiConfig {
        base_url,
        api_token: Some("api-tok".to_string()),
        ..ApiConfig::default()
    })
    .unwrap();
    GetChannelDetailsHandler::new(
        Arc::new(api),
        FrameworkServiceConfig::default(),
        Arc::new(FsAssetReader::new(assets.path())),
        Arc::new(CachedItemStore::new(
            Arc::new(SledKeyValueStore::new(store).unwrap()),
            Duration::from_secs(3600),
        )),
    )
}

fn request(from: CacheStrategy) -> ChannelDetailsRequest {
    ChannelDetailsRequest {
        channel_id: "c1".to_string(),
        from,
    }
}

#[tokio::test]
async fn server_fetch_is_served_from_cache_while_offline() {
    let store = SdkStore::temporary().unwrap();
    let assets = TempDir::new().unwrap();
    let (base_url, server) = serve_once(
        200,
        r#"{"result":{"channel":{"identifier":"c1","name":"Remote","frameworks":[
            {"identifier":"b","index":2},{"identifier":"x"},{"identifier":"a","index":1}]}}}"#,
    )
    .await;

    let online = handler(base_url, &store, &assets);
    let channel = online.handle(request(CacheStrategy::Server)).await.unwrap();
    assert_eq!(channel.name.as_deref(), Some("Remote"));
    server.await.unwrap();

    let offline = handler(closed_base_url().await, &store, &assets);
    let cached = offline.handle(request(CacheStrategy::Cache)).await.unwrap();
    assert_eq!(cached, channel);
    let order: Vec<&str> = cached
        .frameworks
        .as_ref()
        .unwrap()
        .iter()
        .map(|f| f.identifier.as_str())
        .collect();
    assert_eq!(order, vec!["a", "b", "x"]);

    // a forced server lookup falls back to the cached copy when the server is down
    let fallback = offline.handle(request(CacheStrategy::Server)).await.unwrap();
    assert_eq!(fallback.name.as_deref(), Some("Remote"));
}

#[tokio::test]
async fn bundled_asset_seeds_cache_when_offline() {
    let store = SdkStore::temporary().unwrap();
    let assets = TempDir::new().unwrap();
    std::fs::create_dir_all(assets.path().join("data/channel")).unwrap();
    std::fs::write(
        assets.path().join("data/channel/channel-c1.json"),
        r#"{"result":{"channel":{"identifier":"c1","name":"Bundled"}}}"#,
    )
    .unwrap();

    let offline = handler(closed_base_url().await, &store, &assets);
    let channel = offline.handle(request(CacheStrategy::Cache)).await.unwrap();
    assert_eq!(channel.name.as_deref(), Some("Bundled"));
}

#[tokio::test]
async fn nothing_cached_nothing_bundled_and_offline_fails() {
    let store = SdkStore::temporary().unwrap();
    let assets = TempDir::new().unwrap();

    let offline = handler(closed_base_url().await, &store, &assets);
    let err = offline
        .handle(request(CacheStrategy::Cache))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::RequestFailed(_)));
}
