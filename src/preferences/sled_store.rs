//! sled-backed preferences.

use crate::error::ApiError;
use crate::preferences::SharedPreferences;
use crate::store::{JsonTree, SdkStore, TREE_PREFERENCES};
use async_trait::async_trait;
use tracing::warn;

/// Native preference adapter.
///
/// Read failures are reported as an absent value rather than an error: callers treat a
/// missing preference and an unreadable one the same way. Write failures propagate.
pub struct SledSharedPreferences {
    tree: JsonTree,
}

impl SledSharedPreferences {
    pub fn new(store: &SdkStore) -> Result<Self, ApiError> {
        Ok(Self {
            tree: store.open_tree(TREE_PREFERENCES)?,
        })
    }
}

#[async_trait]
impl SharedPreferences for SledSharedPreferences {
    async fn get_string(&self, key: &str) -> Result<Option<String>, ApiError> {
        match self.tree.get::<String>(key) {
            Ok(value) => Ok(value),
            Err(err) => {
                warn!(key = %key, error = %err, "preference read failed; treating as absent");
                Ok(None)
            }
        }
    }

    async fn put_string(&self, key: &str, value: &str) -> Result<(), ApiError> {
        self.tree.put(key, &value)?;
        Ok(())
    }
}
