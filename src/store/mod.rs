//! Local SDK store
//!
//! One sled database per workspace; every local concern (preferences, cache, summaries,
//! content access, profiles) gets its own named tree.

pub mod persistence;

pub use persistence::JsonTree;

use crate::error::StorageError;
use std::io;
use std::path::Path;

pub const TREE_PREFERENCES: &str = "preferences";
pub const TREE_KEY_VALUE: &str = "key_value";
pub const TREE_LEARNER_ASSESSMENTS: &str = "learner_assessments";
pub const TREE_LEARNER_SUMMARIES: &str = "learner_summaries";
pub const TREE_CONTENT_ACCESS: &str = "content_access";
pub const TREE_CONTENT_MARKERS: &str = "content_markers";
pub const TREE_META_DATA: &str = "meta_data";

/// Handle on the workspace sled database.
#[derive(Clone)]
pub struct SdkStore {
    db: sled::Db,
}

impl SdkStore {
    /// Open (or create) the store at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let db = sled::open(path).map_err(to_storage_io)?;
        Ok(Self { db })
    }

    /// Open a store that must already exist at `path`.
    pub fn open_existing<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(StorageError::NotFound(path.display().to_string()));
        }
        let db = sled::Config::new()
            .path(path)
            .create_new(false)
            .open()
            .map_err(to_storage_io)?;
        Ok(Self { db })
    }

    /// Temporary store that is removed when dropped.
    pub fn temporary() -> Result<Self, StorageError> {
        let db = sled::Config::new()
            .temporary(true)
            .open()
            .map_err(to_storage_io)?;
        Ok(Self { db })
    }

    pub fn from_db(db: sled::Db) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &sled::Db {
        &self.db
    }

    pub fn open_tree(&self, name: &str) -> Result<JsonTree, StorageError> {
        let tree = self.db.open_tree(name).map_err(to_storage_io)?;
        Ok(JsonTree::new(tree, self.db.clone()))
    }

    pub fn flush(&self) -> Result<(), StorageError> {
        self.db.flush().map_err(to_storage_io)?;
        Ok(())
    }
}

/// Compose a tree key from id components.
///
/// Each component is written as `<len>:<value>`, so ids may contain any character and
/// the key of a leading subset of components is a prefix only of keys that start with
/// exactly those components.
pub fn record_key(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|part| format!("{}:{}", part.len(), part))
        .collect()
}

pub(crate) fn to_storage_io(err: sled::Error) -> StorageError {
    StorageError::IoError(io::Error::new(io::ErrorKind::Other, err.to_string()))
}

pub(crate) fn to_storage_data(err: serde_json::Error) -> StorageError {
    StorageError::Corrupt(err.to_string())
}
