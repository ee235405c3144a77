//! Bundled asset access.

use crate::error::ApiError;
use async_trait::async_trait;
use std::path::PathBuf;

/// Reads files shipped with the host application.
#[async_trait]
pub trait AssetReader: Send + Sync {
    async fn read_asset(&self, relative_path: &str) -> Result<String, ApiError>;
}

/// Reads assets from a directory on disk.
pub struct FsAssetReader {
    root: PathBuf,
}

impl FsAssetReader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, relative_path: &str) -> PathBuf {
        self.root.join(relative_path.trim_start_matches('/'))
    }
}

#[async_trait]
impl AssetReader for FsAssetReader {
    async fn read_asset(&self, relative_path: &str) -> Result<String, ApiError> {
        let path = self.resolve(relative_path);
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Ok(contents),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(ApiError::AssetNotFound(path))
            }
            Err(err) => Err(crate::error::StorageError::IoError(err).into()),
        }
    }
}
