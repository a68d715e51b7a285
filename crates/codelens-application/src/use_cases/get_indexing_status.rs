//! `get_indexing_status` use case (spec.md §4.1 "Interrupted-indexing recovery", §6).

use codelens_domain::ports::{IndexerPort, VectorStorePort};
use codelens_domain::value_objects::{CodebaseStatus, normalize_codebase_path};
use std::path::Path;
use std::sync::Arc;

use super::manage_index::recover_stale_indexing;
use crate::snapshot::SnapshotStore;

pub enum GetIndexingStatusOutcome {
    Status(CodebaseStatus),
    NotFound,
}

pub struct GetIndexingStatusUseCase {
    snapshot: Arc<SnapshotStore>,
    indexer: Arc<dyn IndexerPort>,
    vector_store: Arc<dyn VectorStorePort>,
}

impl GetIndexingStatusUseCase {
    pub fn new(snapshot: Arc<SnapshotStore>, indexer: Arc<dyn IndexerPort>, vector_store: Arc<dyn VectorStorePort>) -> Self {
        Self { snapshot, indexer, vector_store }
    }

    /// If the tracked status is a stale `indexing` entry (no background task
    /// actually owns it any more — detected by the caller's liveness check,
    /// e.g. process restart), resolve the interrupted-indexing recovery before
    /// reporting status.
    pub async fn execute(&self, path: &Path, looks_stale: bool) -> GetIndexingStatusOutcome {
        let path = normalize_codebase_path(path);
        let Some(status) = self.snapshot.get_status(&path).await else {
            return GetIndexingStatusOutcome::NotFound;
        };

        if looks_stale && matches!(status, CodebaseStatus::Indexing { .. }) {
            recover_stale_indexing(&self.snapshot, &self.vector_store, &self.indexer, &path).await;
            let refreshed = self.snapshot.get_status(&path).await;
            return match refreshed {
                Some(s) => GetIndexingStatusOutcome::Status(s),
                None => GetIndexingStatusOutcome::NotFound,
            };
        }

        GetIndexingStatusOutcome::Status(status)
    }
}
