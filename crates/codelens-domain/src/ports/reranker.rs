//! Reranker port — optional opaque remote reranking collaborator.

use crate::error::Result;
use crate::value_objects::SearchCandidate;
use async_trait::async_trait;

/// Reranker collaborator contract (spec.md §4.4 "Reranking").
#[async_trait]
pub trait RerankerPort: Send + Sync {
    /// Rerank `candidates` against `query`, returning them in the new order.
    /// The returned vector must be a permutation of the input (same length).
    async fn rerank(&self, query: &str, candidates: Vec<SearchCandidate>) -> Result<Vec<SearchCandidate>>;
}
