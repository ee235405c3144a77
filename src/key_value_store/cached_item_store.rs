//! Read-through cache with a freshness window.
//!
//! A cached item lives under `<key_prefix><id>`; the time it was last fetched from the
//! server lives under `<ttl_prefix><id>`. Items seeded from a bundled asset carry no
//! timestamp, so the next cache-first lookup refreshes them.

use crate::error::ApiError;
use crate::key_value_store::KeyValueStore;
use crate::telemetry::now_millis;
use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Where a lookup should prefer to get its value from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStrategy {
    /// Fetch from the server; fall back to a cached copy only if the fetch fails.
    Server,
    /// Prefer the cached copy, then the bundled asset, then the server.
    #[default]
    Cache,
}

/// Keys identifying one cached item.
#[derive(Debug, Clone, Copy)]
pub struct CacheKey<'a> {
    pub id: &'a str,
    pub key_prefix: &'a str,
    pub ttl_prefix: &'a str,
}

impl CacheKey<'_> {
    fn value_key(&self) -> String {
        format!("{}{}", self.key_prefix, self.id)
    }

    fn ttl_key(&self) -> String {
        format!("{}{}", self.ttl_prefix, self.id)
    }
}

pub struct CachedItemStore {
    store: Arc<dyn KeyValueStore>,
    ttl: Duration,
}

impl CachedItemStore {
    pub fn new(store: Arc<dyn KeyValueStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Resolve an item according to `strategy`.
    ///
    /// `from_server` and `from_file` are only polled when the strategy needs them.
    pub async fn get<T>(
        &self,
        key: CacheKey<'_>,
        strategy: CacheStrategy,
        from_server: BoxFuture<'_, Result<T, ApiError>>,
        from_file: Option<BoxFuture<'_, Result<T, ApiError>>>,
    ) -> Result<T, ApiError>
    where
        T: Serialize + DeserializeOwned + Send,
    {
        match strategy {
            CacheStrategy::Server => self.get_from_server_first(key, from_server).await,
            CacheStrategy::Cache => self.get_cached(key, from_server, from_file).await,
        }
    }

    async fn get_from_server_first<T>(
        &self,
        key: CacheKey<'_>,
        from_server: BoxFuture<'_, Result<T, ApiError>>,
    ) -> Result<T, ApiError>
    where
        T: Serialize + DeserializeOwned + Send,
    {
        match from_server.await {
            Ok(value) => {
                self.save(&key, &value, true).await?;
                Ok(value)
            }
            Err(err) => match self.read_cached::<T>(&key).await? {
                Some(cached) => {
                    warn!(key = %key.value_key(), error = %err, "server fetch failed; serving cached copy");
                    Ok(cached)
                }
                None => Err(err),
            },
        }
    }

    async fn get_cached<T>(
        &self,
        key: CacheKey<'_>,
        from_server: BoxFuture<'_, Result<T, ApiError>>,
        from_file: Option<BoxFuture<'_, Result<T, ApiError>>>,
    ) -> Result<T, ApiError>
    where
        T: Serialize + DeserializeOwned + Send,
    {
        if let Some(cached) = self.read_cached::<T>(&key).await? {
            if self.is_fresh(&key).await? {
                return Ok(cached);
            }
            return match from_server.await {
                Ok(value) => {
                    self.save(&key, &value, true).await?;
                    Ok(value)
                }
                Err(err) => {
                    warn!(key = %key.value_key(), error = %err, "refresh failed; serving stale copy");
                    Ok(cached)
                }
            };
        }

        if let Some(from_file) = from_file {
            match from_file.await {
                Ok(value) => {
                    self.save(&key, &value, false).await?;
                    return Ok(value);
                }
                Err(err) => {
                    debug!(key = %key.value_key(), error = %err, "no bundled copy; fetching from server");
                }
            }
        }

        let value = from_server.await?;
        self.save(&key, &value, true).await?;
        Ok(value)
    }

    async fn read_cached<T: DeserializeOwned>(
        &self,
        key: &CacheKey<'_>,
    ) -> Result<Option<T>, ApiError> {
        match self.store.get_value(&key.value_key()).await? {
            Some(raw) if !raw.is_empty() => Ok(Some(serde_json::from_str(&raw)?)),
            _ => Ok(None),
        }
    }

    async fn is_fresh(&self, key: &CacheKey<'_>) -> Result<bool, ApiError> {
        let Some(raw) = self.store.get_value(&key.ttl_key()).await? else {
            return Ok(false);
        };
        let Ok(saved_at) = raw.parse::<u64>() else {
            return Ok(false);
        };
        let age = now_millis().saturating_sub(saved_at);
        Ok(u128::from(age) < self.ttl.as_millis())
    }

    async fn save<T: Serialize>(
        &self,
        key: &CacheKey<'_>,
        value: &T,
        from_server: bool,
    ) -> Result<(), ApiError> {
        let raw = serde_json::to_string(value)?;
        self.store.set_value(&key.value_key(), &raw).await?;
        if from_server {
            self.store
                .set_value(&key.ttl_key(), &now_millis().to_string())
                .await?;
        }
        Ok(())
    }
}
