//! In-memory object store for tests

use std::collections::HashMap;
use std::io::ErrorKind;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::{ObjectStore, StoreError};

/// Preloaded objects, plus keys that fail with a non-miss error
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: HashMap<(String, String), Vec<u8>>,
    failing: HashMap<(String, String), ErrorKind>,
    reads: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_object(mut self, container: &str, key: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.objects
            .insert((container.to_string(), key.to_string()), bytes.into());
        self
    }

    #[must_use]
    pub fn with_failure(mut self, container: &str, key: &str, kind: ErrorKind) -> Self {
        self.failing
            .insert((container.to_string(), key.to_string()), kind);
        self
    }

    /// Number of `get` calls served so far
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn get(&self, container: &str, key: &str) -> Result<Vec<u8>, StoreError> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        let id = (container.to_string(), key.to_string());
        if let Some(kind) = self.failing.get(&id) {
            return match kind {
                ErrorKind::PermissionDenied => Err(StoreError::AccessDenied {
                    container: id.0,
                    key: id.1,
                }),
                kind => Err(StoreError::Io(std::io::Error::new(*kind, "injected failure"))),
            };
        }
        self.objects.get(&id).cloned().ok_or(StoreError::NotFound {
            container: id.0,
            key: id.1,
        })
    }
}
