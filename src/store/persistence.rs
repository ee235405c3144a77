//! JSON-valued sled trees.

use crate::error::StorageError;
use crate::store::{to_storage_data, to_storage_io};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::{Db, Tree};

/// A sled tree whose values are JSON documents.
#[derive(Clone)]
pub struct JsonTree {
    tree: Tree,
    db: Db,
}

impl JsonTree {
    /// `db` is the database owning `tree`; it supplies the id sequence.
    pub fn new(tree: Tree, db: Db) -> Self {
        Self { tree, db }
    }

    pub fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_vec(value).map_err(to_storage_data)?;
        self.tree.insert(key.as_bytes(), raw).map_err(to_storage_io)?;
        Ok(())
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let Some(raw) = self.tree.get(key.as_bytes()).map_err(to_storage_io)? else {
            return Ok(None);
        };
        let parsed = serde_json::from_slice(&raw).map_err(to_storage_data)?;
        Ok(Some(parsed))
    }

    pub fn remove(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self
            .tree
            .remove(key.as_bytes())
            .map_err(to_storage_io)?
            .is_some())
    }

    /// All values whose key starts with `prefix`, in key order.
    pub fn scan_prefix<T: DeserializeOwned>(&self, prefix: &str) -> Result<Vec<T>, StorageError> {
        let mut out = Vec::new();
        for result in self.tree.scan_prefix(prefix.as_bytes()) {
            let (_, value) = result.map_err(to_storage_io)?;
            out.push(serde_json::from_slice(&value).map_err(to_storage_data)?);
        }
        Ok(out)
    }

    /// Remove every key starting with `prefix`; returns how many were removed.
    pub fn remove_prefix(&self, prefix: &str) -> Result<usize, StorageError> {
        let mut keys = Vec::new();
        for result in self.tree.scan_prefix(prefix.as_bytes()) {
            let (key, _) = result.map_err(to_storage_io)?;
            keys.push(key);
        }
        for key in &keys {
            self.tree.remove(key).map_err(to_storage_io)?;
        }
        Ok(keys.len())
    }

    /// Values of the whole tree in key order.
    pub fn values<T: DeserializeOwned>(&self) -> Result<Vec<T>, StorageError> {
        self.scan_prefix("")
    }

    /// Next monotonically increasing id, shared by every tree of the database.
    pub fn next_id(&self) -> Result<u64, StorageError> {
        self.db.generate_id().map_err(to_storage_io)
    }
}

#[cfg(test)]
mod tests {
    use crate::store::SdkStore;
    use serde_json::json;

    #[test]
    fn put_get_and_prefix_operations() {
        let store = SdkStore::temporary().unwrap();
        let tree = store.open_tree("t").unwrap();
        tree.put("u1:c1:1", &json!({ "n": 1 })).unwrap();
        tree.put("u1:c1:2", &json!({ "n": 2 })).unwrap();
        tree.put("u1:c2:1", &json!({ "n": 3 })).unwrap();

        let value: Option<serde_json::Value> = tree.get("u1:c1:2").unwrap();
        assert_eq!(value, Some(json!({ "n": 2 })));

        let scanned: Vec<serde_json::Value> = tree.scan_prefix("u1:c1:").unwrap();
        assert_eq!(scanned.len(), 2);

        assert_eq!(tree.remove_prefix("u1:c1:").unwrap(), 2);
        let remaining: Vec<serde_json::Value> = tree.values().unwrap();
        assert_eq!(remaining, vec![json!({ "n": 3 })]);
    }

    #[test]
    fn ids_increase_across_trees() {
        let store = SdkStore::temporary().unwrap();
        let a = store.open_tree("a").unwrap();
        let b = store.open_tree("b").unwrap();
        let first = a.next_id().unwrap();
        let second = b.next_id().unwrap();
        let third = a.next_id().unwrap();
        assert!(first < second);
        assert!(second < third);
    }

    #[test]
    fn corrupt_values_surface_as_errors() {
        let store = SdkStore::temporary().unwrap();
        let raw = store.db().open_tree("t").unwrap();
        raw.insert("k", "not json".as_bytes()).unwrap();
        let tree = store.open_tree("t").unwrap();
        assert!(tree.get::<serde_json::Value>("k").is_err());
    }
}
