//! `search_codebase` use case (spec.md §4.5 data flow).

use codelens_domain::ports::{IndexerPort, VectorStorePort};
use codelens_domain::value_objects::{ReindexReason, normalize_codebase_path};
use std::sync::Arc;

use crate::capability::CapabilityResolver;
use crate::freshness::{EnsureFreshnessOptions, FreshnessCoordinator};
use crate::search::{SearchOutcome, SearchPipeline, SearchRequest};
use crate::snapshot::SnapshotStore;

use super::gate::{AccessGate, check_access};

/// Result of a `search_codebase` call, before envelope construction.
pub enum SearchCodebaseOutcome {
    Ok(SearchOutcome),
    NotIndexed,
    Indexing { percentage: u8 },
    RequiresReindex { reason: ReindexReason },
    StaleLocal { reason: &'static str },
}

pub struct SearchCodebaseUseCase {
    snapshot: Arc<SnapshotStore>,
    freshness: Arc<FreshnessCoordinator>,
    indexer: Arc<dyn IndexerPort>,
    vector_store: Arc<dyn VectorStorePort>,
    capability: Arc<CapabilityResolver>,
    pipeline: Arc<SearchPipeline>,
}

impl SearchCodebaseUseCase {
    pub fn new(
        snapshot: Arc<SnapshotStore>,
        freshness: Arc<FreshnessCoordinator>,
        indexer: Arc<dyn IndexerPort>,
        vector_store: Arc<dyn VectorStorePort>,
        capability: Arc<CapabilityResolver>,
        pipeline: Arc<SearchPipeline>,
    ) -> Self {
        Self {
            snapshot,
            freshness,
            indexer,
            vector_store,
            capability,
            pipeline,
        }
    }

    pub async fn execute(&self, mut request: SearchRequest, use_reranker: Option<bool>) -> SearchCodebaseOutcome {
        request.codebase_root = normalize_codebase_path(&request.codebase_root);
        let fingerprint = self.indexer.runtime_fingerprint();

        self.freshness
            .ensure_freshness(&request.codebase_root, 0, EnsureFreshnessOptions::default())
            .await;

        match check_access(&self.snapshot, &self.vector_store, &request.codebase_root, &fingerprint).await {
            AccessGate::NotIndexed => SearchCodebaseOutcome::NotIndexed,
            AccessGate::Indexing { percentage } => SearchCodebaseOutcome::Indexing { percentage },
            AccessGate::RequiresReindex { reason, .. } => SearchCodebaseOutcome::RequiresReindex { reason },
            AccessGate::StaleLocal { reason } => SearchCodebaseOutcome::StaleLocal { reason },
            AccessGate::ProbeFailed | AccessGate::Ready => {
                let decision = self.capability.resolve_rerank(use_reranker, request.scope);
                request.use_reranker = decision.reranker.is_some();
                let outcome = self.pipeline.search(&request).await;
                SearchCodebaseOutcome::Ok(outcome)
            }
        }
    }
}
