//! `CapabilityResolver` — resolves at startup which optional collaborator
//! features are available, and resolves the per-request rerank policy from
//! that snapshot (spec.md §2 "CapabilityResolver").

use codelens_domain::ports::RerankerPort;
use codelens_domain::value_objects::SearchScope;
use std::sync::Arc;

/// Snapshot of optional collaborator availability, taken once at startup.
#[derive(Clone)]
pub struct CapabilityResolver {
    reranker: Option<Arc<dyn RerankerPort>>,
    auto_rerank: bool,
}

/// Whether reranking should run for a given request, and the reranker to use.
pub struct RerankDecision {
    pub reranker: Option<Arc<dyn RerankerPort>>,
}

impl CapabilityResolver {
    /// `auto_rerank` enables reranking by default (subject to policy) even
    /// when a request does not explicitly set `useReranker`.
    pub fn new(reranker: Option<Arc<dyn RerankerPort>>, auto_rerank: bool) -> Self {
        Self { reranker, auto_rerank }
    }

    /// Whether the reranker capability is present at all.
    pub fn has_reranker(&self) -> bool {
        self.reranker.is_some()
    }

    /// Resolve the rerank policy for one `search_codebase` call. Reranking is
    /// never applied to `scope=docs` results regardless of capability or flags.
    pub fn resolve_rerank(&self, requested: Option<bool>, scope: SearchScope) -> RerankDecision {
        if scope == SearchScope::Docs {
            return RerankDecision { reranker: None };
        }
        let wants_rerank = requested.unwrap_or(self.auto_rerank);
        RerankDecision {
            reranker: if wants_rerank { self.reranker.clone() } else { None },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use codelens_domain::error::Result;
    use codelens_domain::value_objects::SearchCandidate;

    struct NullReranker;

    #[async_trait]
    impl RerankerPort for NullReranker {
        async fn rerank(&self, _query: &str, candidates: Vec<SearchCandidate>) -> Result<Vec<SearchCandidate>> {
            Ok(candidates)
        }
    }

    #[test]
    fn docs_scope_never_reranks() {
        let resolver = CapabilityResolver::new(Some(Arc::new(NullReranker)), true);
        let decision = resolver.resolve_rerank(Some(true), SearchScope::Docs);
        assert!(decision.reranker.is_none());
    }

    #[test]
    fn auto_rerank_applies_without_explicit_flag() {
        let resolver = CapabilityResolver::new(Some(Arc::new(NullReranker)), true);
        let decision = resolver.resolve_rerank(None, SearchScope::Mixed);
        assert!(decision.reranker.is_some());
    }

    #[test]
    fn missing_capability_never_reranks() {
        let resolver = CapabilityResolver::new(None, true);
        let decision = resolver.resolve_rerank(Some(true), SearchScope::Runtime);
        assert!(decision.reranker.is_none());
    }
}
