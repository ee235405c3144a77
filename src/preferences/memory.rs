//! In-memory preferences for embedding hosts and tests.

use crate::error::ApiError;
use crate::preferences::SharedPreferences;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Default)]
pub struct MemorySharedPreferences {
    values: Mutex<HashMap<String, String>>,
}

impl MemorySharedPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value without going through the async interface.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).cloned()
    }
}

#[async_trait]
impl SharedPreferences for MemorySharedPreferences {
    async fn get_string(&self, key: &str) -> Result<Option<String>, ApiError> {
        Ok(self.values.lock().get(key).cloned())
    }

    async fn put_string(&self, key: &str, value: &str) -> Result<(), ApiError> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}
