//! In-memory `VectorStorePort` adapter: a default, dependency-free collaborator
//! for development and tests, grounded on the teacher's
//! `InMemoryVectorStoreProvider` (`DashMap`-backed collections, generated ids).
//!
//! Real deployments wire a remote vector database behind this same port; this
//! adapter exists so the workspace has no hard external dependency out of the
//! box and so tests never need network access.

use async_trait::async_trait;
use codelens_domain::error::{Error, Result};
use codelens_domain::ports::{HybridSearchOptions, HybridSearchRequest, VectorStorePort};
use codelens_domain::value_objects::{IndexCompletionMarker, SearchCandidate};
use dashmap::DashMap;
use std::collections::HashSet;

struct Collection {
    dim: usize,
    rows: Vec<SearchCandidate>,
    marker: Option<IndexCompletionMarker>,
}

/// In-memory vector store: text-overlap scoring stands in for real dense +
/// sparse ranking since this adapter never sees embedding vectors — the port
/// hides embedding as an implementation detail of the collaborator.
pub struct InMemoryVectorStore {
    collections: DashMap<String, Collection>,
}

impl InMemoryVectorStore {
    /// An empty store with no collections.
    pub fn new() -> Self {
        Self { collections: DashMap::new() }
    }
}

impl Default for InMemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowercased whitespace/punctuation-split token set.
fn tokenize(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Jaccard overlap between the query tokens and a candidate's content plus
/// breadcrumbs, in `[0, 1]`.
fn lexical_score(query_tokens: &HashSet<String>, candidate: &SearchCandidate) -> f32 {
    if query_tokens.is_empty() {
        return 0.0;
    }
    let mut doc_tokens = tokenize(&candidate.content);
    for crumb in &candidate.breadcrumbs {
        doc_tokens.extend(tokenize(crumb));
    }
    if doc_tokens.is_empty() {
        return 0.0;
    }
    let intersection = query_tokens.intersection(&doc_tokens).count();
    let union = query_tokens.union(&doc_tokens).count();
    if union == 0 {
        0.0
    } else {
        intersection as f32 / union as f32
    }
}

#[async_trait]
impl VectorStorePort for InMemoryVectorStore {
    async fn list_collections(&self) -> Result<Vec<String>> {
        Ok(self.collections.iter().map(|e| e.key().clone()).collect())
    }

    async fn create_hybrid_collection(&self, name: &str, dim: usize) -> Result<()> {
        self.collections
            .entry(name.to_string())
            .or_insert_with(|| Collection { dim, rows: Vec::new(), marker: None });
        Ok(())
    }

    async fn has_collection(&self, name: &str) -> Result<bool> {
        Ok(self.collections.contains_key(name))
    }

    async fn insert_hybrid(&self, name: &str, rows: Vec<SearchCandidate>) -> Result<()> {
        let mut collection = self
            .collections
            .get_mut(name)
            .ok_or_else(|| Error::vector_store(format!("collection '{name}' not found")))?;
        collection.rows.extend(rows);
        Ok(())
    }

    async fn hybrid_search(
        &self,
        name: &str,
        requests: Vec<HybridSearchRequest>,
        _options: HybridSearchOptions,
    ) -> Result<Vec<Vec<SearchCandidate>>> {
        let collection = self
            .collections
            .get(name)
            .ok_or_else(|| Error::vector_store(format!("collection '{name}' not found")))?;

        let mut out = Vec::with_capacity(requests.len());
        for request in requests {
            let query_tokens = tokenize(&request.query);
            let mut scored: Vec<SearchCandidate> = collection
                .rows
                .iter()
                .map(|candidate| {
                    let mut scored = candidate.clone();
                    scored.score = lexical_score(&query_tokens, candidate);
                    scored
                })
                .collect();
            scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
            scored.truncate(request.top_k);
            out.push(scored);
        }
        Ok(out)
    }

    async fn delete(&self, name: &str, relative_paths: &[String]) -> Result<()> {
        if let Some(mut collection) = self.collections.get_mut(name) {
            collection.rows.retain(|row| !relative_paths.contains(&row.relative_path));
        }
        Ok(())
    }

    async fn write_completion_marker(&self, name: &str, marker: &IndexCompletionMarker) -> Result<()> {
        let mut collection = self
            .collections
            .get_mut(name)
            .ok_or_else(|| Error::vector_store(format!("collection '{name}' not found")))?;
        collection.marker = Some(marker.clone());
        Ok(())
    }

    async fn get_completion_marker(&self, name: &str) -> Result<Option<IndexCompletionMarker>> {
        Ok(self.collections.get(name).and_then(|c| c.marker.clone()))
    }

    async fn clear_completion_marker(&self, name: &str) -> Result<()> {
        if let Some(mut collection) = self.collections.get_mut(name) {
            collection.marker = None;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(path: &str, content: &str) -> SearchCandidate {
        SearchCandidate {
            relative_path: path.to_string(),
            start_line: 1,
            end_line: 10,
            content: content.to_string(),
            score: 0.0,
            symbol_id: None,
            symbol_label: None,
            breadcrumbs: Vec::new(),
        }
    }

    #[tokio::test]
    async fn search_ranks_lexical_overlap() {
        let store = InMemoryVectorStore::new();
        store.create_hybrid_collection("c", 8).await.unwrap();
        store
            .insert_hybrid(
                "c",
                vec![
                    candidate("a.rs", "fn parse_config() -> Config"),
                    candidate("b.rs", "fn unrelated_thing() -> bool"),
                ],
            )
            .await
            .unwrap();

        let results = store
            .hybrid_search(
                "c",
                vec![HybridSearchRequest { query: "parse config".into(), top_k: 10 }],
                HybridSearchOptions::default(),
            )
            .await
            .unwrap();

        assert_eq!(results[0][0].relative_path, "a.rs");
    }

    #[tokio::test]
    async fn marker_round_trips_separately_from_rows() {
        let store = InMemoryVectorStore::new();
        store.create_hybrid_collection("c", 8).await.unwrap();
        assert!(store.get_completion_marker("c").await.unwrap().is_none());

        let marker = IndexCompletionMarker {
            kind: "index_completion_v1".into(),
            codebase_path: "/repo".into(),
            fingerprint: codelens_domain::value_objects::IndexFingerprint {
                embedding_provider: "p".into(),
                embedding_model: "m".into(),
                embedding_dimension: 8,
                vector_store_provider: "in_memory".into(),
                schema_version: "1".into(),
            },
            indexed_files: 1,
            total_chunks: 1,
            completed_at: chrono::Utc::now(),
            run_id: "run-1".into(),
        };
        store.write_completion_marker("c", &marker).await.unwrap();
        assert!(store.get_completion_marker("c").await.unwrap().is_some());

        store.clear_completion_marker("c").await.unwrap();
        assert!(store.get_completion_marker("c").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_removes_matching_relative_paths() {
        let store = InMemoryVectorStore::new();
        store.create_hybrid_collection("c", 8).await.unwrap();
        store.insert_hybrid("c", vec![candidate("a.rs", "x"), candidate("b.rs", "y")]).await.unwrap();

        store.delete("c", &["a.rs".to_string()]).await.unwrap();

        let results = store
            .hybrid_search("c", vec![HybridSearchRequest { query: "x".into(), top_k: 10 }], HybridSearchOptions::default())
            .await
            .unwrap();
        assert_eq!(results[0].len(), 1);
        assert_eq!(results[0][0].relative_path, "b.rs");
    }
}
