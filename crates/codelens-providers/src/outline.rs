//! Null `OutlineProviderPort` adapter: reports no sidecar present, so
//! `file_outline` and `call_graph` consistently surface as unsupported rather
//! than guessing at symbol structure without a real AST sidecar wired in.
//! Mirrors [`crate::reranker::NullReranker`]'s passthrough-default idiom.

use async_trait::async_trait;
use codelens_domain::error::Result;
use codelens_domain::ports::OutlineProviderPort;
use codelens_domain::value_objects::{CallGraphDirection, CallGraphResult, FileOutline, SymbolRef};
use std::path::Path;

/// Reports no outline/call-graph sidecar for any codebase.
#[derive(Default)]
pub struct NoSidecarOutlineProvider;

#[async_trait]
impl OutlineProviderPort for NoSidecarOutlineProvider {
    async fn has_sidecar(&self, _codebase_root: &Path) -> bool {
        false
    }

    async fn file_outline(&self, _codebase_root: &Path, _relative_file: &str) -> Result<Option<FileOutline>> {
        Ok(None)
    }

    async fn call_graph(
        &self,
        _codebase_root: &Path,
        _symbol_ref: &SymbolRef,
        _direction: CallGraphDirection,
        _depth: u8,
        _limit: usize,
    ) -> Result<CallGraphResult> {
        Ok(CallGraphResult { nodes: Vec::new(), edges: Vec::new() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reports_no_sidecar() {
        let provider = NoSidecarOutlineProvider;
        assert!(!provider.has_sidecar(Path::new("/repo")).await);
        assert!(provider.file_outline(Path::new("/repo"), "a.rs").await.unwrap().is_none());
    }
}
