//! File-backed [`StateStoreProvider`] — each key is one file under a base
//! directory; `save` writes to a sibling temp file and renames it into place
//! so a crash mid-write never leaves a half-written snapshot on disk.

use async_trait::async_trait;
use codelens_domain::error::{Error, Result};
use codelens_domain::ports::StateStoreProvider;
use std::path::PathBuf;

/// A [`StateStoreProvider`] backed by plain files under `base_dir`.
pub struct FileStateStore {
    base_dir: PathBuf,
}

impl FileStateStore {
    /// Use `base_dir` as the root for all keys, creating it lazily on first save.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self { base_dir: base_dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.base_dir.join(sanitize_key(key))
    }
}

/// Keys are opaque but we still defend against path traversal: replace any
/// separator-like character so a key can never escape `base_dir`.
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| if c == '/' || c == '\\' || c == '.' { '_' } else { c })
        .collect()
}

#[async_trait]
impl StateStoreProvider for FileStateStore {
    async fn save(&self, key: &str, data: &[u8]) -> Result<()> {
        tokio::fs::create_dir_all(&self.base_dir)
            .await
            .map_err(|e| Error::io_with_source(format!("failed to create {}", self.base_dir.display()), e))?;

        let target = self.path_for(key);
        let tmp = target.with_extension("tmp");
        tokio::fs::write(&tmp, data)
            .await
            .map_err(|e| Error::io_with_source(format!("failed to write {}", tmp.display()), e))?;
        tokio::fs::rename(&tmp, &target)
            .await
            .map_err(|e| Error::io_with_source(format!("failed to commit {}", target.display()), e))?;

        tracing::debug!(key, bytes = data.len(), "[STATE] saved");
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(self.path_for(key)).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::io_with_source(format!("failed to read key '{key}'"), e)),
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::io_with_source(format!("failed to delete key '{key}'"), e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn round_trips_a_value() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStateStore::new(dir.path());

        assert_eq!(store.load("snapshot").await.unwrap(), None);

        store.save("snapshot", b"hello").await.unwrap();
        assert_eq!(store.load("snapshot").await.unwrap(), Some(b"hello".to_vec()));

        store.save("snapshot", b"world").await.unwrap();
        assert_eq!(store.load("snapshot").await.unwrap(), Some(b"world".to_vec()));

        store.delete("snapshot").await.unwrap();
        assert_eq!(store.load("snapshot").await.unwrap(), None);
    }

    #[tokio::test]
    async fn delete_of_missing_key_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStateStore::new(dir.path());
        assert!(store.delete("does-not-exist").await.is_ok());
    }

    #[tokio::test]
    async fn sanitizes_traversal_attempts() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStateStore::new(dir.path());
        store.save("../../etc/passwd", b"nope").await.unwrap();
        assert!(!dir.path().parent().unwrap().join("etc/passwd").exists());
    }
}
