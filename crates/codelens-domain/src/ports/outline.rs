//! Outline/call-graph port — the AST sidecar collaborator behind `file_outline`
//! and `call_graph`, explicitly out of scope for this coordinator (spec.md §1)
//! and depended on through this narrow contract, mirroring [`super::IndexerPort`].

use crate::error::Result;
use crate::value_objects::{CallGraphDirection, CallGraphResult, FileOutline, SymbolRef};
use async_trait::async_trait;
use std::path::Path;

/// The outline/call-graph sidecar contract.
#[async_trait]
pub trait OutlineProviderPort: Send + Sync {
    /// Whether a call-graph/outline sidecar exists for this codebase at all.
    async fn has_sidecar(&self, codebase_root: &Path) -> bool;

    /// The outline (symbol list) for one file, if the sidecar covers it.
    async fn file_outline(&self, codebase_root: &Path, relative_file: &str) -> Result<Option<FileOutline>>;

    /// Bounded BFS traversal of the call graph from `symbol_ref`.
    async fn call_graph(
        &self,
        codebase_root: &Path,
        symbol_ref: &SymbolRef,
        direction: CallGraphDirection,
        depth: u8,
        limit: usize,
    ) -> Result<CallGraphResult>;
}
