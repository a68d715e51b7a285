//! Vector store port — the opaque external vector database collaborator (spec.md §6).

use crate::error::Result;
use crate::value_objects::{IndexCompletionMarker, SearchCandidate};
use async_trait::async_trait;

/// One request in a `hybrid_search` batch call.
#[derive(Debug, Clone)]
pub struct HybridSearchRequest {
    /// The semantic query text for this request
    pub query: String,
    /// Maximum number of candidates to request
    pub top_k: usize,
}

/// Options accompanying a `hybrid_search` call.
#[derive(Debug, Clone, Default)]
pub struct HybridSearchOptions {
    /// Metadata filter expression (e.g. extension/path restrictions). The
    /// vector store contract requires every call to implicitly exclude the
    /// reserved completion-marker document; callers do not need to add that
    /// exclusion themselves — the adapter does it.
    pub filter_expr: Option<String>,
}

/// Vector store collaborator contract (spec.md §6).
///
/// Implementations own per-collection concurrency; the coordinator treats the
/// store as a single shared external resource and never assumes anything about
/// internal locking.
#[async_trait]
pub trait VectorStorePort: Send + Sync {
    /// List all collection names.
    async fn list_collections(&self) -> Result<Vec<String>>;

    /// Create a hybrid (dense + sparse) collection with the given embedding dimension.
    async fn create_hybrid_collection(&self, name: &str, dim: usize) -> Result<()>;

    /// Whether a collection with this name exists.
    async fn has_collection(&self, name: &str) -> Result<bool>;

    /// Insert chunk rows with their dense vectors into a collection.
    async fn insert_hybrid(&self, name: &str, rows: Vec<SearchCandidate>) -> Result<()>;

    /// Run one or more hybrid search requests against a collection.
    ///
    /// Every request's effective filter always excludes the reserved
    /// completion-marker sentinel document.
    async fn hybrid_search(
        &self,
        name: &str,
        requests: Vec<HybridSearchRequest>,
        options: HybridSearchOptions,
    ) -> Result<Vec<Vec<SearchCandidate>>>;

    /// Delete rows by relative path from a collection.
    async fn delete(&self, name: &str, relative_paths: &[String]) -> Result<()>;

    /// Write the completion-marker document for a codebase's collection.
    async fn write_completion_marker(&self, name: &str, marker: &IndexCompletionMarker) -> Result<()>;

    /// Read the completion-marker document for a codebase's collection, if present and parseable.
    ///
    /// Returns `Ok(None)` for "missing or invalid payload" (spec.md §4.1 stale-local step 4);
    /// returns `Err` only for a transient probe failure (step 3).
    async fn get_completion_marker(&self, name: &str) -> Result<Option<IndexCompletionMarker>>;

    /// Clear the completion-marker document for a codebase's collection.
    async fn clear_completion_marker(&self, name: &str) -> Result<()>;
}
