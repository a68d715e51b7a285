//! `RerankerPort` adapters: a null passthrough and a lexical-overlap reranker,
//! grounded on the same dependency-free default-adapter idiom as
//! [`crate::vector_store::InMemoryVectorStore`].

use async_trait::async_trait;
use codelens_domain::error::Result;
use codelens_domain::ports::RerankerPort;
use codelens_domain::value_objects::SearchCandidate;
use std::collections::HashSet;

/// Returns candidates in their input order, unchanged. Used when a capability
/// toggle calls for a reranker but no real one is configured.
#[derive(Default)]
pub struct NullReranker;

#[async_trait]
impl RerankerPort for NullReranker {
    async fn rerank(&self, _query: &str, candidates: Vec<SearchCandidate>) -> Result<Vec<SearchCandidate>> {
        Ok(candidates)
    }
}

fn tokenize(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Reorders candidates by query/content token overlap, breaking ties on the
/// original vector-store score. A cheap local stand-in for a cross-encoder
/// reranking service.
#[derive(Default)]
pub struct LexicalReranker;

#[async_trait]
impl RerankerPort for LexicalReranker {
    async fn rerank(&self, query: &str, mut candidates: Vec<SearchCandidate>) -> Result<Vec<SearchCandidate>> {
        let query_tokens = tokenize(query);
        let mut scored: Vec<(f32, SearchCandidate)> = candidates
            .drain(..)
            .map(|c| {
                let doc_tokens = tokenize(&c.content);
                let overlap = query_tokens.intersection(&doc_tokens).count() as f32;
                (overlap, c)
            })
            .collect();

        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(b.1.score.partial_cmp(&a.1.score).unwrap_or(std::cmp::Ordering::Equal))
        });

        Ok(scored.into_iter().map(|(_, c)| c).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(path: &str, content: &str, score: f32) -> SearchCandidate {
        SearchCandidate {
            relative_path: path.to_string(),
            start_line: 1,
            end_line: 1,
            content: content.to_string(),
            score,
            symbol_id: None,
            symbol_label: None,
            breadcrumbs: Vec::new(),
        }
    }

    #[tokio::test]
    async fn null_reranker_preserves_order() {
        let input = vec![candidate("a.rs", "x", 0.1), candidate("b.rs", "y", 0.9)];
        let out = NullReranker.rerank("query", input.clone()).await.unwrap();
        assert_eq!(out[0].relative_path, input[0].relative_path);
    }

    #[tokio::test]
    async fn lexical_reranker_prefers_token_overlap() {
        let input = vec![
            candidate("a.rs", "totally unrelated content", 0.9),
            candidate("b.rs", "parse config from disk", 0.1),
        ];
        let out = LexicalReranker.rerank("parse config", input).await.unwrap();
        assert_eq!(out[0].relative_path, "b.rs");
    }

    #[tokio::test]
    async fn lexical_reranker_breaks_ties_on_original_score() {
        let input = vec![candidate("low.rs", "x", 0.1), candidate("high.rs", "x", 0.9)];
        let out = LexicalReranker.rerank("unrelated", input).await.unwrap();
        assert_eq!(out[0].relative_path, "high.rs");
    }
}
