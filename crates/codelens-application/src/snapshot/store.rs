//! The snapshot store — durable per-codebase state machine (spec.md §4.1).
//!
//! All mutating operations are serialized through a single process-wide
//! mutex, matching spec.md §4.1 "Concurrency". Readers take the same lock
//! but only ever clone out primitive/owned values, so no caller can hold a
//! reference into the store across an `.await` point.

use chrono::Utc;
use codelens_domain::error::Result;
use codelens_domain::ports::StateStoreProvider;
use codelens_domain::value_objects::{
    CodebaseInfo, CodebaseStatus, FingerprintSource, IndexCompleteness, IndexFingerprint,
    IndexManifest, ReindexReason, SyncDelta, normalize_codebase_path,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::persisted::{PersistedSnapshot, SNAPSHOT_STATE_KEY};

/// Known status-tag values, used to clamp unknown ones on load (spec.md §4.1).
const KNOWN_STATUS_TAGS: &[&str] = &[
    "not_found",
    "indexing",
    "indexed",
    "sync_completed",
    "requires_reindex",
    "indexfailed",
];

/// Outcome of [`SnapshotStore::ensure_fingerprint_compatibility_on_access`].
#[derive(Debug, Clone)]
pub struct FingerprintGateResult {
    /// Whether the caller may proceed with the access.
    pub allowed: bool,
    /// Whether this call itself performed the `indexed|sync_completed -> requires_reindex` transition.
    pub changed: bool,
    /// Human-readable explanation when `allowed` is false.
    pub message: Option<String>,
}

/// The durable per-codebase state machine.
pub struct SnapshotStore {
    state: Mutex<HashMap<PathBuf, CodebaseInfo>>,
    persistence: Arc<dyn StateStoreProvider>,
}

impl SnapshotStore {
    /// Construct a store backed by `persistence`, with an empty in-memory map.
    /// Call [`Self::load`] once at startup to hydrate it.
    pub fn new(persistence: Arc<dyn StateStoreProvider>) -> Self {
        Self {
            state: Mutex::new(HashMap::new()),
            persistence,
        }
    }

    /// Load the persisted snapshot file if present, tolerating unknown extra
    /// fields and clamping unknown status tags to `indexfailed`.
    pub async fn load(&self) -> Result<()> {
        let Some(bytes) = self.persistence.load(SNAPSHOT_STATE_KEY).await? else {
            return Ok(());
        };

        let mut raw: serde_json::Value = serde_json::from_slice(&bytes)?;
        clamp_unknown_statuses(&mut raw);

        let persisted: PersistedSnapshot = serde_json::from_value(raw)?;
        let mut state = self.state.lock().await;
        *state = persisted.into_map();
        Ok(())
    }

    /// Serialize and persist the full map.
    pub async fn save(&self) -> Result<()> {
        let state = self.state.lock().await;
        let persisted = PersistedSnapshot::from_map(&state);
        drop(state);
        let bytes = serde_json::to_vec_pretty(&persisted)?;
        self.persistence.save(SNAPSHOT_STATE_KEY, &bytes).await
    }

    /// Read the status of a codebase, if tracked.
    pub async fn get_status(&self, path: &Path) -> Option<CodebaseStatus> {
        let path = normalize_codebase_path(path);
        self.state.lock().await.get(&path).map(|i| i.status.clone())
    }

    /// Read the full tracked info for a codebase, if tracked.
    pub async fn get_info(&self, path: &Path) -> Option<CodebaseInfo> {
        let path = normalize_codebase_path(path);
        self.state.lock().await.get(&path).cloned()
    }

    /// All tracked codebases.
    pub async fn get_all(&self) -> Vec<CodebaseInfo> {
        self.state.lock().await.values().cloned().collect()
    }

    /// All codebases currently `indexed` or `sync_completed`.
    pub async fn get_indexed(&self) -> Vec<CodebaseInfo> {
        self.state
            .lock()
            .await
            .values()
            .filter(|i| i.status.is_queryable())
            .cloned()
            .collect()
    }

    /// All codebases currently `indexing`.
    pub async fn get_indexing(&self) -> Vec<CodebaseInfo> {
        self.state
            .lock()
            .await
            .values()
            .filter(|i| matches!(i.status, CodebaseStatus::Indexing { .. }))
            .cloned()
            .collect()
    }

    async fn upsert(&self, path: &Path, f: impl FnOnce(&mut CodebaseInfo)) {
        let path = normalize_codebase_path(path);
        {
            let mut state = self.state.lock().await;
            let entry = state.entry(path.clone()).or_insert_with(|| {
                CodebaseInfo::new_indexing(path.clone(), Utc::now())
            });
            f(entry);
        }
        self.persist_or_warn().await;
    }

    /// Flush the full map to disk, logging rather than propagating a failure
    /// so a transient write error never blocks a mutation in progress.
    async fn persist_or_warn(&self) {
        if let Err(err) = self.save().await {
            tracing::warn!(target: "snapshot", error = %err, "[SNAPSHOT] failed to persist snapshot after mutation");
        }
    }

    /// Transition a codebase to `indexing`.
    pub async fn set_indexing(&self, path: &Path, percentage: u8) {
        self.upsert(path, |info| {
            info.status = CodebaseStatus::Indexing {
                indexing_percentage: percentage.min(100),
                last_updated: Utc::now(),
            };
        })
        .await;
    }

    /// Transition a codebase to `indexed`.
    pub async fn set_indexed(
        &self,
        path: &Path,
        indexed_files: u64,
        total_chunks: u64,
        index_status: IndexCompleteness,
        fingerprint: IndexFingerprint,
        source: FingerprintSource,
    ) {
        self.upsert(path, |info| {
            info.status = CodebaseStatus::Indexed {
                indexed_files,
                total_chunks,
                index_status,
                last_updated: Utc::now(),
                index_fingerprint: fingerprint,
                fingerprint_source: source,
            };
        })
        .await;
    }

    /// Transition a codebase to `indexfailed`.
    pub async fn set_index_failed(&self, path: &Path, error_message: String, last_pct: Option<u8>) {
        self.upsert(path, |info| {
            info.status = CodebaseStatus::IndexFailed {
                error_message,
                last_attempted_percentage: last_pct,
                last_updated: Utc::now(),
            };
        })
        .await;
    }

    /// Transition a codebase to `sync_completed`.
    pub async fn set_sync_completed(
        &self,
        path: &Path,
        delta: SyncDelta,
        fingerprint: IndexFingerprint,
        source: FingerprintSource,
    ) {
        self.upsert(path, |info| {
            info.status = CodebaseStatus::SyncCompleted {
                delta,
                last_updated: Utc::now(),
                index_fingerprint: fingerprint,
                fingerprint_source: source,
            };
        })
        .await;
    }

    /// Transition a codebase to `requires_reindex`.
    pub async fn set_requires_reindex(
        &self,
        path: &Path,
        reason: ReindexReason,
        fingerprint: Option<IndexFingerprint>,
        message: String,
    ) {
        self.upsert(path, |info| {
            info.status = CodebaseStatus::RequiresReindex {
                message,
                last_updated: Utc::now(),
                index_fingerprint: fingerprint,
                reindex_reason: reason,
            };
        })
        .await;
    }

    /// Replace the index manifest for a codebase.
    pub async fn set_index_manifest(&self, path: &Path, relative_paths: Vec<String>) {
        self.upsert(path, |info| {
            info.index_manifest = relative_paths.into_iter().collect();
        })
        .await;
    }

    /// Set the ignore-rules version counter.
    pub async fn set_ignore_rules_version(&self, path: &Path, version: u64) {
        self.upsert(path, |info| {
            info.ignore_rules_version = version;
        })
        .await;
    }

    /// Set the ignore-control signature.
    pub async fn set_ignore_control_signature(&self, path: &Path, signature: String) {
        self.upsert(path, |info| {
            info.ignore_control_signature = Some(signature);
        })
        .await;
    }

    /// Remove a codebase entirely (spec.md "Destroyed").
    pub async fn remove_completely(&self, path: &Path) {
        let path = normalize_codebase_path(path);
        self.state.lock().await.remove(&path);
        self.persist_or_warn().await;
    }

    /// The fingerprint gate (spec.md §4.1 `ensureFingerprintCompatibilityOnAccess`).
    pub async fn ensure_fingerprint_compatibility_on_access(
        &self,
        path: &Path,
        runtime_fingerprint: &IndexFingerprint,
    ) -> FingerprintGateResult {
        let path = normalize_codebase_path(path);
        let result = {
            let mut state = self.state.lock().await;
            let Some(info) = state.get_mut(&path) else {
                return FingerprintGateResult {
                    allowed: true,
                    changed: false,
                    message: None,
                };
            };

            if matches!(info.status, CodebaseStatus::RequiresReindex { .. }) {
                return FingerprintGateResult {
                    allowed: false,
                    changed: false,
                    message: Some("codebase requires reindex".to_string()),
                };
            }

            match info.status.fingerprint() {
                Some(stored) if stored != runtime_fingerprint => {
                    let stored = stored.clone();
                    info.status = CodebaseStatus::RequiresReindex {
                        message: "stored index fingerprint no longer matches the runtime fingerprint"
                            .to_string(),
                        last_updated: Utc::now(),
                        index_fingerprint: Some(stored),
                        reindex_reason: ReindexReason::FingerprintMismatch,
                    };
                    FingerprintGateResult {
                        allowed: false,
                        changed: true,
                        message: Some("fingerprint_mismatch".to_string()),
                    }
                }
                _ => FingerprintGateResult {
                    allowed: true,
                    changed: false,
                    message: None,
                },
            }
        };

        if result.changed {
            self.persist_or_warn().await;
        }
        result
    }

    /// Manifest for a codebase, empty if untracked.
    pub async fn get_manifest(&self, path: &Path) -> IndexManifest {
        let path = normalize_codebase_path(path);
        self.state
            .lock()
            .await
            .get(&path)
            .map(|i| i.index_manifest.clone())
            .unwrap_or_default()
    }
}

/// Rewrite any `codebases.*.status` tag not in [`KNOWN_STATUS_TAGS`] to
/// `indexfailed` with a synthesized error message, so forward-incompatible
/// persisted documents still load (spec.md §4.1 `load()`).
fn clamp_unknown_statuses(raw: &mut serde_json::Value) {
    let Some(codebases) = raw.get_mut("codebases").and_then(|v| v.as_object_mut()) else {
        return;
    };

    for (_, entry) in codebases.iter_mut() {
        let Some(status) = entry.get_mut("status") else {
            continue;
        };
        let tag_known = status
            .get("status")
            .and_then(|t| t.as_str())
            .map(|t| KNOWN_STATUS_TAGS.contains(&t))
            .unwrap_or(false);

        if !tag_known {
            *status = serde_json::json!({
                "status": "indexfailed",
                "error_message": "unrecognized persisted status clamped on load",
                "last_attempted_percentage": serde_json::Value::Null,
                "last_updated": Utc::now().to_rfc3339(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codelens_domain::ports::StateStoreProvider;
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct InMemoryPersistence {
        data: StdMutex<HashMap<String, Vec<u8>>>,
    }

    #[async_trait::async_trait]
    impl StateStoreProvider for InMemoryPersistence {
        async fn save(&self, key: &str, data: &[u8]) -> codelens_domain::error::Result<()> {
            self.data.lock().unwrap().insert(key.to_string(), data.to_vec());
            Ok(())
        }

        async fn load(&self, key: &str) -> codelens_domain::error::Result<Option<Vec<u8>>> {
            Ok(self.data.lock().unwrap().get(key).cloned())
        }

        async fn delete(&self, key: &str) -> codelens_domain::error::Result<()> {
            self.data.lock().unwrap().remove(key);
            Ok(())
        }
    }

    fn fingerprint(schema: &str) -> IndexFingerprint {
        IndexFingerprint {
            embedding_provider: "p".into(),
            embedding_model: "m".into(),
            embedding_dimension: 768,
            vector_store_provider: "v".into(),
            schema_version: schema.into(),
        }
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let persistence = Arc::new(InMemoryPersistence::default());
        let store = SnapshotStore::new(persistence.clone());
        store.set_indexing(Path::new("/repo"), 42).await;
        store.save().await.unwrap();

        let store2 = SnapshotStore::new(persistence);
        store2.load().await.unwrap();
        let status = store2.get_status(Path::new("/repo")).await.unwrap();
        assert_eq!(status.kind(), "indexing");
    }

    #[tokio::test]
    async fn fingerprint_mismatch_transitions_to_requires_reindex() {
        let persistence = Arc::new(InMemoryPersistence::default());
        let store = SnapshotStore::new(persistence);
        store
            .set_indexed(
                Path::new("/repo"),
                10,
                100,
                IndexCompleteness::Completed,
                fingerprint("dense_v3"),
                FingerprintSource::Verified,
            )
            .await;

        let runtime = fingerprint("hybrid_v3");
        let result = store
            .ensure_fingerprint_compatibility_on_access(Path::new("/repo"), &runtime)
            .await;
        assert!(!result.allowed);
        assert!(result.changed);

        let status = store.get_status(Path::new("/repo")).await.unwrap();
        match status {
            CodebaseStatus::RequiresReindex { reindex_reason, .. } => {
                assert_eq!(reindex_reason, ReindexReason::FingerprintMismatch);
            }
            other => panic!("expected requires_reindex, got {other:?}"),
        }

        // Second call on an already-requires_reindex entry does not mutate again.
        let result2 = store
            .ensure_fingerprint_compatibility_on_access(Path::new("/repo"), &runtime)
            .await;
        assert!(!result2.allowed);
        assert!(!result2.changed);
    }

    #[tokio::test]
    async fn unknown_status_tag_clamps_to_indexfailed() {
        let persistence = Arc::new(InMemoryPersistence::default());
        let raw = serde_json::json!({
            "version": 1,
            "codebases": {
                "/repo": {
                    "path": "/repo",
                    "status": { "status": "from_the_future", "foo": "bar" },
                    "index_manifest": [],
                    "ignore_rules_version": 0,
                    "ignore_control_signature": null,
                }
            }
        });
        persistence
            .save(SNAPSHOT_STATE_KEY, &serde_json::to_vec(&raw).unwrap())
            .await
            .unwrap();

        let store = SnapshotStore::new(persistence);
        store.load().await.unwrap();
        let status = store.get_status(Path::new("/repo")).await.unwrap();
        assert_eq!(status.kind(), "indexfailed");
    }
}
