//! Key-value storage and the read-through cache built on it.

use crate::error::ApiError;
use async_trait::async_trait;

pub mod cached_item_store;
pub mod memory;
pub mod sled_store;

pub use cached_item_store::{CacheStrategy, CachedItemStore};
pub use memory::MemoryKeyValueStore;
pub use sled_store::SledKeyValueStore;

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get_value(&self, key: &str) -> Result<Option<String>, ApiError>;
    async fn set_value(&self, key: &str, value: &str) -> Result<(), ApiError>;
}
