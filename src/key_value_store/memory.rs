use crate::error::ApiError;
use crate::key_value_store::KeyValueStore;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Default)]
pub struct MemoryKeyValueStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get_value(&self, key: &str) -> Result<Option<String>, ApiError> {
        Ok(self.values.lock().get(key).cloned())
    }

    async fn set_value(&self, key: &str, value: &str) -> Result<(), ApiError> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}
