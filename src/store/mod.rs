//! Object store access
//!
//! The edge reads origin objects by `(container, key)`. The store is built
//! once at startup and shared read-only by every request.

mod fs;
#[cfg(test)]
pub mod memory;

pub use fs::FsObjectStore;

use async_trait::async_trait;

/// Error type for object store reads.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("no such key: {container}/{key}")]
    NotFound { container: String, key: String },

    #[error("access denied: {container}/{key}")]
    AccessDenied { container: String, key: String },

    #[error("invalid object key: {0}")]
    InvalidKey(String),

    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Read-only key/value object store
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch the bytes stored under `key` in `container`
    async fn get(&self, container: &str, key: &str) -> Result<Vec<u8>, StoreError>;
}

/// Reject keys that could escape their container
pub(crate) fn validate_key(key: &str) -> Result<(), StoreError> {
    let escapes = key.is_empty()
        || key.starts_with('/')
        || key.contains('\\')
        || key.split('/').any(|segment| segment == "..");
    if escapes {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}
