//! `call_graph` use case (spec.md §6, §9 "tagged edges + arena-like node table").

use codelens_domain::constants::{CALL_GRAPH_MAX_DEPTH, CALL_GRAPH_MIN_DEPTH};
use codelens_domain::ports::{IndexerPort, OutlineProviderPort, VectorStorePort};
use codelens_domain::value_objects::{
    CallGraphDirection, CallGraphResult, ReindexReason, SymbolRef, normalize_codebase_path,
};
use std::path::PathBuf;
use std::sync::Arc;

use crate::snapshot::SnapshotStore;

use super::gate::{AccessGate, check_access};

#[derive(Debug, Clone)]
pub struct CallGraphRequest {
    pub codebase_root: PathBuf,
    pub symbol_ref: SymbolRef,
    pub direction: CallGraphDirection,
    pub depth: u8,
    pub limit: usize,
}

pub enum CallGraphOutcome {
    Ok(CallGraphResult),
    NotFound,
    NotIndexed,
    Indexing { percentage: u8 },
    RequiresReindex { reason: ReindexReason },
    Unsupported,
}

pub struct CallGraphUseCase {
    snapshot: Arc<SnapshotStore>,
    indexer: Arc<dyn IndexerPort>,
    vector_store: Arc<dyn VectorStorePort>,
    outline: Option<Arc<dyn OutlineProviderPort>>,
}

impl CallGraphUseCase {
    pub fn new(
        snapshot: Arc<SnapshotStore>,
        indexer: Arc<dyn IndexerPort>,
        vector_store: Arc<dyn VectorStorePort>,
        outline: Option<Arc<dyn OutlineProviderPort>>,
    ) -> Self {
        Self {
            snapshot,
            indexer,
            vector_store,
            outline,
        }
    }

    pub async fn execute(&self, request: CallGraphRequest) -> CallGraphOutcome {
        let Some(outline_provider) = &self.outline else {
            return CallGraphOutcome::Unsupported;
        };

        let path = normalize_codebase_path(&request.codebase_root);
        let fingerprint = self.indexer.runtime_fingerprint();
        match check_access(&self.snapshot, &self.vector_store, &path, &fingerprint).await {
            AccessGate::NotIndexed => return CallGraphOutcome::NotIndexed,
            AccessGate::Indexing { percentage } => return CallGraphOutcome::Indexing { percentage },
            AccessGate::RequiresReindex { reason, .. } => return CallGraphOutcome::RequiresReindex { reason },
            AccessGate::StaleLocal { .. } => return CallGraphOutcome::NotIndexed,
            AccessGate::ProbeFailed | AccessGate::Ready => {}
        }

        if !outline_provider.has_sidecar(&path).await {
            return CallGraphOutcome::Unsupported;
        }

        let depth = request.depth.clamp(CALL_GRAPH_MIN_DEPTH, CALL_GRAPH_MAX_DEPTH);
        match outline_provider
            .call_graph(&path, &request.symbol_ref, request.direction, depth, request.limit)
            .await
        {
            Ok(result) if !result.nodes.is_empty() => CallGraphOutcome::Ok(result),
            Ok(_) => CallGraphOutcome::NotFound,
            Err(_) => CallGraphOutcome::NotFound,
        }
    }
}
