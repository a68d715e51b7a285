//! `manage_index` use case: `create | sync | status | clear` (spec.md §6).

use chrono::Utc;
use codelens_domain::error::{Error, Result};
use codelens_domain::ports::{IgnoreMatcherFactory, IndexerPort, VectorStorePort};
use codelens_domain::value_objects::{
    CodebaseStatus, FingerprintSource, IndexCompleteness, IndexCompletionMarker, ReindexReason,
    collection_name_for, normalize_codebase_path,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

use crate::freshness::{EnsureFreshnessOptions, FreshnessCoordinator, FreshnessDecision};
use crate::snapshot::SnapshotStore;

/// `manage_index.action` argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManageIndexAction {
    Create,
    Sync,
    Status,
    Clear,
}

/// `manage_index` request arguments.
#[derive(Debug, Clone)]
pub struct ManageIndexRequest {
    pub action: ManageIndexAction,
    pub path: PathBuf,
    pub force: bool,
    pub ignore_patterns: Vec<String>,
}

/// `manage_index` outcome.
#[derive(Debug, Clone)]
pub enum ManageIndexOutcome {
    Created,
    AlreadyIndexing { percentage: u8 },
    Synced(Box<FreshnessDecision>),
    Status(Option<CodebaseStatus>),
    Cleared,
    NotFound,
}

pub struct ManageIndexUseCase {
    snapshot: Arc<SnapshotStore>,
    freshness: Arc<FreshnessCoordinator>,
    indexer: Arc<dyn IndexerPort>,
    vector_store: Arc<dyn VectorStorePort>,
    ignore_factory: Arc<dyn IgnoreMatcherFactory>,
}

impl ManageIndexUseCase {
    pub fn new(
        snapshot: Arc<SnapshotStore>,
        freshness: Arc<FreshnessCoordinator>,
        indexer: Arc<dyn IndexerPort>,
        vector_store: Arc<dyn VectorStorePort>,
        ignore_factory: Arc<dyn IgnoreMatcherFactory>,
    ) -> Self {
        Self {
            snapshot,
            freshness,
            indexer,
            vector_store,
            ignore_factory,
        }
    }

    pub async fn execute(&self, request: ManageIndexRequest) -> Result<ManageIndexOutcome> {
        let path = normalize_codebase_path(&request.path);
        match request.action {
            ManageIndexAction::Create => self.create(&path, request.force, &request.ignore_patterns).await,
            ManageIndexAction::Sync => {
                let decision = self.freshness.ensure_freshness(&path, 0, EnsureFreshnessOptions::default()).await;
                Ok(ManageIndexOutcome::Synced(Box::new(decision)))
            }
            ManageIndexAction::Status => Ok(ManageIndexOutcome::Status(self.snapshot.get_status(&path).await)),
            ManageIndexAction::Clear => {
                let collection = collection_name_for(&path);
                let _ = self.vector_store.clear_completion_marker(&collection).await;
                self.snapshot.remove_completely(&path).await;
                Ok(ManageIndexOutcome::Cleared)
            }
        }
    }

    async fn create(&self, path: &Path, force: bool, ignore_patterns: &[String]) -> Result<ManageIndexOutcome> {
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Err(Error::invalid_argument(format!("{} does not exist", path.display())));
        }

        if let Some(status) = self.snapshot.get_status(path).await {
            match status {
                CodebaseStatus::Indexing { indexing_percentage, .. } => {
                    return Ok(ManageIndexOutcome::AlreadyIndexing { percentage: indexing_percentage });
                }
                CodebaseStatus::RequiresReindex { .. } if !force => {
                    return Err(Error::invalid_argument("codebase requires_reindex; pass force=true to rebuild"));
                }
                _ if !force && status.is_queryable() => {
                    return Ok(ManageIndexOutcome::AlreadyIndexing { percentage: 100 });
                }
                _ => {}
            }
        }

        let _matcher = self.ignore_factory.build(path, ignore_patterns);
        self.snapshot.set_indexing(path, 0).await;

        let path_owned = path.to_path_buf();
        let snapshot = Arc::clone(&self.snapshot);
        let indexer = Arc::clone(&self.indexer);
        let vector_store = Arc::clone(&self.vector_store);

        tokio::spawn(async move {
            run_index(path_owned, snapshot, indexer, vector_store).await;
        });

        Ok(ManageIndexOutcome::Created)
    }
}

async fn run_index(
    path: PathBuf,
    snapshot: Arc<SnapshotStore>,
    indexer: Arc<dyn IndexerPort>,
    vector_store: Arc<dyn VectorStorePort>,
) {
    let progress_snapshot = Arc::clone(&snapshot);
    let progress_path = path.clone();
    let progress: codelens_domain::ports::ProgressCallback = Box::new(move |pct| {
        let snapshot = Arc::clone(&progress_snapshot);
        let path = progress_path.clone();
        tokio::spawn(async move {
            snapshot.set_indexing(&path, pct).await;
        });
    });

    match indexer.index_codebase(&path, progress).await {
        Ok(outcome) => {
            let fingerprint = indexer.runtime_fingerprint();
            let collection = collection_name_for(&path);
            let marker = IndexCompletionMarker {
                kind: codelens_domain::value_objects::COMPLETION_MARKER_KIND.to_string(),
                codebase_path: path.to_string_lossy().to_string(),
                fingerprint: fingerprint.clone(),
                indexed_files: outcome.indexed_files,
                total_chunks: outcome.total_chunks,
                completed_at: Utc::now(),
                run_id: Uuid::new_v4().to_string(),
            };
            if let Err(err) = vector_store.write_completion_marker(&collection, &marker).await {
                tracing::warn!(target: "indexing", path = %path.display(), error = %err, "[INDEX] failed to write completion marker");
            }
            if let Ok(tracked) = indexer.tracked_relative_paths(&path).await {
                snapshot.set_index_manifest(&path, tracked).await;
            }
            snapshot
                .set_indexed(&path, outcome.indexed_files, outcome.total_chunks, outcome.status, fingerprint, FingerprintSource::Verified)
                .await;
        }
        Err(err) => {
            tracing::warn!(target: "indexing", path = %path.display(), error = %err, "[INDEX] full index run failed");
            snapshot.set_index_failed(&path, err.to_string(), None).await;
        }
    }
}

/// Resolve the recovery decision for a stale `indexing` entry found at
/// startup or by `get_indexing_status` (spec.md §4.1 "Interrupted-indexing
/// recovery"), applying the resulting transition to the snapshot.
pub async fn recover_stale_indexing(
    snapshot: &SnapshotStore,
    vector_store: &Arc<dyn VectorStorePort>,
    indexer: &Arc<dyn IndexerPort>,
    path: &Path,
) {
    use super::gate::{RecoveryDecision, decide_recovery};

    let fingerprint = indexer.runtime_fingerprint();
    match decide_recovery(vector_store, path, &fingerprint).await {
        RecoveryDecision::PromoteIndexed => {
            let tracked = indexer.tracked_relative_paths(path).await.unwrap_or_default();
            let file_count = tracked.len() as u64;
            snapshot.set_index_manifest(path, tracked).await;
            snapshot
                .set_indexed(path, file_count, 0, IndexCompleteness::Completed, fingerprint, FingerprintSource::Verified)
                .await;
        }
        RecoveryDecision::MarkFailed { reason } => {
            let reindex_reason = match reason {
                "fingerprint_mismatch" => ReindexReason::FingerprintMismatch,
                _ => ReindexReason::Manual,
            };
            snapshot
                .set_requires_reindex(path, reindex_reason, Some(fingerprint), format!("interrupted indexing run: {reason}"))
                .await;
        }
    }
}
