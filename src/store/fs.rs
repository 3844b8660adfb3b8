//! Filesystem-backed object store
//!
//! Objects live at `{root}/{container}/{key}`.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use super::{validate_key, ObjectStore, StoreError};

#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn object_path(&self, container: &str, key: &str) -> Result<PathBuf, StoreError> {
        validate_key(key)?;
        if container.is_empty() || container.contains(['/', '\\']) || container == ".." {
            return Err(StoreError::InvalidKey(format!("{container}/{key}")));
        }
        Ok(self.root.join(container).join(key))
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn get(&self, container: &str, key: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.object_path(container, key)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            // A directory at the key is a miss, not a failure
            Err(e) if e.kind() == ErrorKind::NotFound || path.is_dir() => {
                Err(StoreError::NotFound {
                    container: container.to_string(),
                    key: key.to_string(),
                })
            }
            Err(e) if e.kind() == ErrorKind::PermissionDenied => Err(StoreError::AccessDenied {
                container: container.to_string(),
                key: key.to_string(),
            }),
            Err(e) => Err(StoreError::Io(e)),
        }
    }
}
