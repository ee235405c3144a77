use crate::error::ApiError;
use crate::key_value_store::KeyValueStore;
use crate::store::{JsonTree, SdkStore, TREE_KEY_VALUE};
use async_trait::async_trait;

pub struct SledKeyValueStore {
    tree: JsonTree,
}

impl SledKeyValueStore {
    pub fn new(store: &SdkStore) -> Result<Self, ApiError> {
        Ok(Self {
            tree: store.open_tree(TREE_KEY_VALUE)?,
        })
    }
}

#[async_trait]
impl KeyValueStore for SledKeyValueStore {
    async fn get_value(&self, key: &str) -> Result<Option<String>, ApiError> {
        Ok(self.tree.get(key)?)
    }

    async fn set_value(&self, key: &str, value: &str) -> Result<(), ApiError> {
        self.tree.put(key, &value)?;
        Ok(())
    }
}
