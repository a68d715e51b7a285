//! `file_outline` use case (spec.md §6).

use codelens_domain::ports::{IndexerPort, OutlineProviderPort, VectorStorePort};
use codelens_domain::value_objects::{FileOutline, OutlineSymbol, ReindexReason, normalize_codebase_path};
use std::path::PathBuf;
use std::sync::Arc;

use crate::snapshot::SnapshotStore;

use super::gate::{AccessGate, check_access};

/// `file_outline.resolveMode` argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveMode {
    Outline,
    Exact,
}

#[derive(Debug, Clone)]
pub struct FileOutlineRequest {
    pub codebase_root: PathBuf,
    pub file: String,
    pub limit_symbols: Option<usize>,
    pub resolve_mode: ResolveMode,
    pub symbol_label_exact: Option<String>,
}

pub enum FileOutlineOutcome {
    Ok { symbols: Vec<OutlineSymbol>, has_more: bool },
    Ambiguous { candidates: Vec<OutlineSymbol> },
    NotFound,
    NotIndexed,
    Indexing { percentage: u8 },
    RequiresReindex { reason: ReindexReason },
    Unsupported,
}

pub struct FileOutlineUseCase {
    snapshot: Arc<SnapshotStore>,
    indexer: Arc<dyn IndexerPort>,
    vector_store: Arc<dyn VectorStorePort>,
    outline: Option<Arc<dyn OutlineProviderPort>>,
}

impl FileOutlineUseCase {
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

    pub async fn execute(&self, request: FileOutlineRequest) -> FileOutlineOutcome {
        let Some(outline_provider) = &self.outline else {
            return FileOutlineOutcome::Unsupported;
        };

        let path = normalize_codebase_path(&request.codebase_root);
        let fingerprint = self.indexer.runtime_fingerprint();
        match check_access(&self.snapshot, &self.vector_store, &path, &fingerprint).await {
            AccessGate::NotIndexed => return FileOutlineOutcome::NotIndexed,
            AccessGate::Indexing { percentage } => return FileOutlineOutcome::Indexing { percentage },
            AccessGate::RequiresReindex { reason, .. } => return FileOutlineOutcome::RequiresReindex { reason },
            AccessGate::StaleLocal { .. } => return FileOutlineOutcome::NotIndexed,
            AccessGate::ProbeFailed | AccessGate::Ready => {}
        }

        if !outline_provider.has_sidecar(&path).await {
            return FileOutlineOutcome::Unsupported;
        }

        let Ok(Some(FileOutline { mut symbols, .. })) = outline_provider.file_outline(&path, &request.file).await else {
            return FileOutlineOutcome::NotFound;
        };

        if request.resolve_mode == ResolveMode::Exact {
            if let Some(label) = &request.symbol_label_exact {
                let matches: Vec<OutlineSymbol> = symbols.into_iter().filter(|s| &s.label == label).collect();
                return match matches.len() {
                    0 => FileOutlineOutcome::NotFound,
                    1 => FileOutlineOutcome::Ok { symbols: matches, has_more: false },
                    _ => FileOutlineOutcome::Ambiguous { candidates: matches },
                };
            }
        }

        let limit = request.limit_symbols.unwrap_or(symbols.len()).max(1);
        let has_more = symbols.len() > limit;
        symbols.truncate(limit);
        FileOutlineOutcome::Ok { symbols, has_more }
    }
}
