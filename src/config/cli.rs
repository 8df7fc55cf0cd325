use crate::core::Storage;
use crate::utils::error::{Result, RotationError};
use std::path::PathBuf;

/// Reads artifacts from the lineage directory on local disk.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = self.base_path.join(path);
        let result = tokio::fs::read(&full_path).await;
        result.map_err(|source| RotationError::ArtifactError {
            path: full_path,
            source,
        })
    }
}
