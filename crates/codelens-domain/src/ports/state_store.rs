//! State store port — simple key-value persistence for the snapshot file.

use crate::error::Result;
use async_trait::async_trait;

/// Key-value persistence used by the snapshot store to durably save/load the
/// whole codebase map as a single blob (spec.md §4.1 `load`/`save`).
#[async_trait]
pub trait StateStoreProvider: Send + Sync {
    /// Save `data` under `key`, atomically replacing any previous value.
    async fn save(&self, key: &str, data: &[u8]) -> Result<()>;

    /// Load the bytes stored under `key`, if any.
    async fn load(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Delete the value stored under `key`, if any.
    async fn delete(&self, key: &str) -> Result<()>;
}
