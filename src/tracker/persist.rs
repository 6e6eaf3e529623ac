//! Usage Store Module
//!
//! Persistence backends for the serialized access-frequency mapping.

use std::fmt::Debug;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{CacheError, Result};

/// Slot holding the whole serialized mapping.
///
/// `load` returns `None` when nothing has been saved yet.
#[async_trait]
pub trait UsageStore: Send + Sync + Debug {
    async fn load(&self) -> Result<Option<String>>;
    async fn save(&self, serialized: &str) -> Result<()>;
}

// == Memory Store ==
/// Keeps the serialized mapping in process memory.
#[derive(Debug, Default)]
pub struct MemoryUsageStore {
    slot: Mutex<Option<String>>,
}

impl MemoryUsageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with raw content, valid or not.
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(contents.into())),
        }
    }
}

#[async_trait]
impl UsageStore for MemoryUsageStore {
    async fn load(&self) -> Result<Option<String>> {
        let slot = self
            .slot
            .lock()
            .map_err(|e| CacheError::Internal(format!("usage store lock poisoned: {e}")))?;
        Ok(slot.clone())
    }

    async fn save(&self, serialized: &str) -> Result<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|e| CacheError::Internal(format!("usage store lock poisoned: {e}")))?;
        *slot = Some(serialized.to_string());
        Ok(())
    }
}

// == File Store ==
/// Keeps the serialized mapping in a JSON file, read and written with
/// `tokio::fs` off the async worker threads.
#[derive(Debug, Clone)]
pub struct FileUsageStore {
    path: PathBuf,
}

impl FileUsageStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[async_trait]
impl UsageStore for FileUsageStore {
    async fn load(&self) -> Result<Option<String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, serialized: &str) -> Result<()> {
        tokio::fs::write(&self.path, serialized).await?;
        Ok(())
    }
}
