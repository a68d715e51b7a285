//! `SearchPipeline` — the full post-processing chain behind `search_codebase`
//! (spec.md §4.4): scope filter, concurrent primary/expanded passes, post-filter
//! and expansion retry, must-filter bounded retry, optional reranking, the
//! changed-files boost, grouping, merging, and the noise-mitigation hint.

use std::path::Path;
use std::sync::Arc;

use codelens_domain::constants::{
    MUST_FILTER_MAX_RETRIES, MUST_FILTER_TOPK_CEILING, SEARCH_CANDIDATE_POOL,
    SEARCH_CANDIDATE_POOL_MAX,
};
use codelens_domain::ports::{HybridSearchOptions, HybridSearchRequest, OutlineProviderPort, RerankerPort, VectorStorePort};
use codelens_domain::value_objects::{
    RankingMode, ResultMode, SearchCandidate, SearchPass, SearchScope, WarningCode, WarningRegistry,
    collection_name_for,
};

use super::changed_files::{CHANGED_FILE_SCORE_BOOST, ChangedFilesCache};
use super::grouping::{GroupedResult, NavigationFallback, group_and_clamp, merge_adjacent_chunks};
use super::noise::{NoiseMitigationHint, evaluate_noise};
use super::operators::parse_query;
use super::scope::keep_under_scope;

/// Inputs to a single `search_codebase` call (spec.md §4.4 "Inputs").
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub codebase_root: std::path::PathBuf,
    pub query: String,
    pub limit: usize,
    pub scope: SearchScope,
    pub result_mode: ResultMode,
    pub extension_filter: Vec<String>,
    pub exclude_patterns: Vec<String>,
    pub use_reranker: bool,
    pub ranking_mode: RankingMode,
}

/// Either a raw merged chunk or a grouped representative in the final payload.
#[derive(Debug, Clone)]
pub enum SearchResult {
    Raw(SearchCandidate),
    Grouped(GroupedResult),
}

/// Diagnostics reported alongside the results of a reranking attempt.
#[derive(Debug, Clone, Default)]
pub struct RerankSummary {
    pub enabled: bool,
    pub attempted: bool,
    pub applied: bool,
    pub error_code: Option<&'static str>,
}

/// Full pipeline output.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub results: Vec<SearchResult>,
    pub warnings: Vec<String>,
    pub rerank: RerankSummary,
    pub noise_mitigation: Option<NoiseMitigationHint>,
    pub is_error: bool,
    pub error_message: Option<String>,
}

pub struct SearchPipeline {
    vector_store: Arc<dyn VectorStorePort>,
    reranker: Option<Arc<dyn RerankerPort>>,
    changed_files: Arc<ChangedFilesCache>,
    outline: Option<Arc<dyn OutlineProviderPort>>,
}

impl SearchPipeline {
    pub fn new(
        vector_store: Arc<dyn VectorStorePort>,
        reranker: Option<Arc<dyn RerankerPort>>,
        changed_files: Arc<ChangedFilesCache>,
        outline: Option<Arc<dyn OutlineProviderPort>>,
    ) -> Self {
        Self {
            vector_store,
            reranker,
            changed_files,
            outline,
        }
    }

    pub async fn search(&self, request: &SearchRequest) -> SearchOutcome {
        let parsed = parse_query(&request.query);
        let collection = collection_name_for(&request.codebase_root);

        let mut warnings = Vec::new();
        let mut pool = SEARCH_CANDIDATE_POOL;
        let mut candidates = match self.run_passes(&collection, &parsed.semantic_query, pool, &mut warnings).await {
            Ok(c) => c,
            Err(message) => {
                return SearchOutcome {
                    results: Vec::new(),
                    warnings,
                    rerank: RerankSummary::default(),
                    noise_mitigation: None,
                    is_error: true,
                    error_message: Some(message),
                };
            }
        };

        candidates = self.apply_filters(candidates, request, &parsed);

        if candidates.len() < request.limit && pool < SEARCH_CANDIDATE_POOL_MAX {
            pool = SEARCH_CANDIDATE_POOL_MAX;
            if let Ok(widened) = self.run_passes(&collection, &parsed.semantic_query, pool, &mut warnings).await {
                candidates = self.apply_filters(widened, request, &parsed);
            }
        }

        let must_tokens: Vec<String> = parsed.must_tokens().iter().map(|s| s.to_lowercase()).collect();
        if !must_tokens.is_empty() {
            let mut retries = 0;
            let mut widened_pool = pool;
            while !satisfies_must(&candidates, &must_tokens) && retries < MUST_FILTER_MAX_RETRIES {
                widened_pool = (widened_pool * 2).min(MUST_FILTER_TOPK_CEILING);
                retries += 1;
                match self.run_passes(&collection, &parsed.semantic_query, widened_pool, &mut warnings).await {
                    Ok(widened) => candidates = self.apply_filters(widened, request, &parsed),
                    Err(_) => break,
                }
                if widened_pool >= MUST_FILTER_TOPK_CEILING {
                    break;
                }
            }
            if !satisfies_must(&candidates, &must_tokens) {
                warnings.push(WarningRegistry::format(WarningCode::FilterMustUnsatisfied, None));
                candidates.clear();
            }
        }

        if request.ranking_mode == RankingMode::AutoChangedFirst {
            if let Some(changed) = self.changed_files.resolve(&request.codebase_root).await {
                for candidate in &mut candidates {
                    if changed.contains(&candidate.relative_path) {
                        candidate.score += CHANGED_FILE_SCORE_BOOST;
                    }
                }
                candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
            }
        }

        let rerank = self.maybe_rerank(request, &parsed.semantic_query, &mut candidates, &mut warnings).await;

        candidates.truncate(request.limit.max(1) * 4);

        match request.result_mode {
            ResultMode::Grouped => {
                let grouped = group_and_clamp(candidates);
                let mut grouped: Vec<GroupedResult> = grouped.into_iter().take(request.limit).collect();
                let sidecar_present = match &self.outline {
                    Some(outline) => outline.has_sidecar(&request.codebase_root).await,
                    None => false,
                };
                for group in &mut grouped {
                    if group.representative.symbol_id.is_none() {
                        group.navigation_fallback =
                            Some(navigation_fallback_for(&request.codebase_root, &group.representative, sidecar_present));
                    }
                }
                let noise_mitigation = evaluate_noise(&grouped, request.limit);
                SearchOutcome {
                    results: grouped.into_iter().map(SearchResult::Grouped).collect(),
                    warnings,
                    rerank,
                    noise_mitigation,
                    is_error: false,
                    error_message: None,
                }
            }
            ResultMode::Raw => {
                let codebase_root = request.codebase_root.clone();
                let merged = merge_adjacent_chunks(candidates, |relative_path, start_line, end_line| {
                    read_line_span(&codebase_root, relative_path, start_line, end_line)
                });
                let merged: Vec<SearchCandidate> = merged.into_iter().take(request.limit).collect();
                SearchOutcome {
                    results: merged.into_iter().map(SearchResult::Raw).collect(),
                    warnings,
                    rerank,
                    noise_mitigation: None,
                    is_error: false,
                    error_message: None,
                }
            }
        }
    }

    async fn run_passes(
        &self,
        collection: &str,
        semantic_query: &str,
        top_k: usize,
        warnings: &mut Vec<String>,
    ) -> Result<Vec<SearchCandidate>, String> {
        let expanded_query = format!("{semantic_query} {}", codelens_domain::value_objects::SEARCH_EXPANSION_TOKENS);
        let requests = vec![
            HybridSearchRequest {
                query: semantic_query.to_string(),
                top_k,
            },
            HybridSearchRequest {
                query: expanded_query,
                top_k,
            },
        ];

        let result = self
            .vector_store
            .hybrid_search(collection, requests, HybridSearchOptions::default())
            .await;

        match result {
            Ok(mut passes) if passes.len() == 2 => {
                let expanded = passes.pop().unwrap_or_default();
                let primary = passes.pop().unwrap_or_default();
                let mut combined = primary;
                combined.extend(expanded);
                Ok(combined)
            }
            Ok(_) | Err(_) => self.run_passes_independently(collection, semantic_query, top_k, warnings).await,
        }
    }

    async fn run_passes_independently(
        &self,
        collection: &str,
        semantic_query: &str,
        top_k: usize,
        warnings: &mut Vec<String>,
    ) -> Result<Vec<SearchCandidate>, String> {
        let expanded_query = format!("{semantic_query} {}", codelens_domain::value_objects::SEARCH_EXPANSION_TOKENS);
        let (primary, expanded) = tokio::join!(
            self.vector_store.hybrid_search(
                collection,
                vec![HybridSearchRequest { query: semantic_query.to_string(), top_k }],
                HybridSearchOptions::default(),
            ),
            self.vector_store.hybrid_search(
                collection,
                vec![HybridSearchRequest { query: expanded_query, top_k }],
                HybridSearchOptions::default(),
            ),
        );

        let primary_hits = primary.ok().and_then(|mut v| v.pop());
        let expanded_hits = expanded.ok().and_then(|mut v| v.pop());

        match (primary_hits, expanded_hits) {
            (Some(mut p), Some(e)) => {
                p.extend(e);
                Ok(p)
            }
            (Some(p), None) => {
                warnings.push(WarningRegistry::format(WarningCode::SearchPassFailed, Some(SearchPass::Expanded.id())));
                Ok(p)
            }
            (None, Some(e)) => {
                warnings.push(WarningRegistry::format(WarningCode::SearchPassFailed, Some(SearchPass::Primary.id())));
                Ok(e)
            }
            (None, None) => {
                warnings.push(WarningRegistry::format(WarningCode::AllPassesFailed, None));
                Err("all semantic search passes failed".to_string())
            }
        }
    }

    fn apply_filters(
        &self,
        candidates: Vec<SearchCandidate>,
        request: &SearchRequest,
        parsed: &codelens_domain::value_objects::ParsedQuery,
    ) -> Vec<SearchCandidate> {
        let exclude_globs: Vec<String> = parsed
            .exclude_globs()
            .into_iter()
            .map(str::to_string)
            .chain(request.exclude_patterns.iter().cloned())
            .collect();
        let path_globs: Vec<&str> = parsed.path_filters();
        let lang_filters: Vec<&str> = parsed.lang_filters();

        candidates
            .into_iter()
            .filter(|c| keep_under_scope(request.scope, &c.relative_path))
            .filter(|c| !exclude_globs.iter().any(|g| glob_matches(g, &c.relative_path)))
            .filter(|c| path_globs.is_empty() || path_globs.iter().any(|g| glob_matches(g, &c.relative_path)))
            .filter(|c| request.extension_filter.is_empty() || matches_extension(&c.relative_path, &request.extension_filter))
            .filter(|c| lang_filters.is_empty() || lang_filters.iter().any(|lang| matches_language(&c.relative_path, lang)))
            .collect()
    }

    async fn maybe_rerank(
        &self,
        request: &SearchRequest,
        semantic_query: &str,
        candidates: &mut Vec<SearchCandidate>,
        warnings: &mut Vec<String>,
    ) -> RerankSummary {
        let policy_allows = request.scope != SearchScope::Docs;
        let Some(reranker) = self.reranker.as_ref().filter(|_| request.use_reranker && policy_allows) else {
            return RerankSummary {
                enabled: request.use_reranker && policy_allows,
                attempted: false,
                applied: false,
                error_code: None,
            };
        };

        match reranker.rerank(semantic_query, std::mem::take(candidates)).await {
            Ok(reranked) => {
                *candidates = reranked;
                RerankSummary {
                    enabled: true,
                    attempted: true,
                    applied: true,
                    error_code: None,
                }
            }
            Err(err) => {
                tracing::warn!(target: "search", error = %err, "[SEARCH] reranker failed, falling back to unreranked order");
                warnings.push(WarningRegistry::format(WarningCode::RerankerFailed, None));
                RerankSummary {
                    enabled: true,
                    attempted: true,
                    applied: false,
                    error_code: Some("reranker_failed"),
                }
            }
        }
    }
}

/// Navigation fallback for a grouped result whose representative has no
/// stable symbol id (spec.md §4.4 "Navigation fallback").
fn navigation_fallback_for(codebase_root: &Path, representative: &SearchCandidate, sidecar_present: bool) -> NavigationFallback {
    let absolute_path = codebase_root.join(&representative.relative_path).to_string_lossy().to_string();
    NavigationFallback {
        message: "no stable symbol id for this match; read the file directly for full context".to_string(),
        codebase_root: codebase_root.to_string_lossy().to_string(),
        relative_file: representative.relative_path.clone(),
        absolute_path,
        read_span_start: representative.start_line,
        read_span_end: representative.end_line,
        file_outline_window: sidecar_present,
    }
}

/// Read the union line span for a merged chunk, 1-indexed inclusive.
fn read_line_span(codebase_root: &Path, relative_path: &str, start_line: u32, end_line: u32) -> Option<String> {
    let contents = std::fs::read_to_string(codebase_root.join(relative_path)).ok()?;
    let lines: Vec<&str> = contents.lines().collect();
    let start = start_line.max(1) as usize;
    if start > lines.len() {
        return None;
    }
    let end = (end_line.max(start_line) as usize).min(lines.len());
    Some(lines[start - 1..end].join("\n"))
}

fn satisfies_must(candidates: &[SearchCandidate], must_tokens: &[String]) -> bool {
    if candidates.is_empty() {
        return must_tokens.is_empty();
    }
    candidates.iter().all(|c| {
        let lower = c.content.to_lowercase();
        must_tokens.iter().all(|t| lower.contains(t.as_str()))
    })
}

fn glob_matches(pattern: &str, relative_path: &str) -> bool {
    glob::Pattern::new(pattern).map(|p| p.matches(relative_path)).unwrap_or(false)
}

fn matches_extension(relative_path: &str, extensions: &[String]) -> bool {
    let ext = Path::new(relative_path).extension().and_then(|e| e.to_str()).unwrap_or("");
    extensions.iter().any(|e| e.trim_start_matches('.') == ext)
}

fn matches_language(relative_path: &str, lang: &str) -> bool {
    let ext = Path::new(relative_path).extension().and_then(|e| e.to_str()).unwrap_or("");
    let lang = lang.to_lowercase();
    match lang.as_str() {
        "rust" => ext == "rs",
        "typescript" | "ts" => ext == "ts" || ext == "tsx",
        "javascript" | "js" => ext == "js" || ext == "jsx",
        "python" | "py" => ext == "py",
        "go" => ext == "go",
        other => ext == other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use codelens_domain::error::Result;

    fn candidate(path: &str, content: &str, score: f32) -> SearchCandidate {
        SearchCandidate {
            relative_path: path.to_string(),
            start_line: 1,
            end_line: 5,
            content: content.to_string(),
            score,
            symbol_id: None,
            symbol_label: None,
            breadcrumbs: Vec::new(),
        }
    }

    struct StubVectorStore {
        hits: Vec<SearchCandidate>,
    }

    #[async_trait]
    impl VectorStorePort for StubVectorStore {
        async fn list_collections(&self) -> Result<Vec<String>> {
            Ok(Vec::new())
        }
        async fn create_hybrid_collection(&self, _name: &str, _dim: usize) -> Result<()> {
            Ok(())
        }
        async fn has_collection(&self, _name: &str) -> Result<bool> {
            Ok(true)
        }
        async fn insert_hybrid(&self, _name: &str, _rows: Vec<SearchCandidate>) -> Result<()> {
            Ok(())
        }
        async fn hybrid_search(
            &self,
            _name: &str,
            requests: Vec<HybridSearchRequest>,
            _options: HybridSearchOptions,
        ) -> Result<Vec<Vec<SearchCandidate>>> {
            Ok(requests.iter().map(|_| self.hits.clone()).collect())
        }
        async fn delete(&self, _name: &str, _relative_paths: &[String]) -> Result<()> {
            Ok(())
        }
        async fn write_completion_marker(
            &self,
            _name: &str,
            _marker: &codelens_domain::value_objects::IndexCompletionMarker,
        ) -> Result<()> {
            unreachable!("not exercised by pipeline tests")
        }
        async fn get_completion_marker(
            &self,
            _name: &str,
        ) -> Result<Option<codelens_domain::value_objects::IndexCompletionMarker>> {
            Ok(None)
        }
        async fn clear_completion_marker(&self, _name: &str) -> Result<()> {
            Ok(())
        }
    }

    struct NullGit;

    #[async_trait]
    impl codelens_domain::ports::GitStatusPort for NullGit {
        async fn changed_tracked_files(&self, _root: &Path) -> Result<Vec<String>> {
            Ok(Vec::new())
        }
    }

    fn make_request(query: &str) -> SearchRequest {
        SearchRequest {
            codebase_root: Path::new("/repo").to_path_buf(),
            query: query.to_string(),
            limit: 10,
            scope: SearchScope::Mixed,
            result_mode: ResultMode::Raw,
            extension_filter: Vec::new(),
            exclude_patterns: Vec::new(),
            use_reranker: false,
            ranking_mode: RankingMode::Default,
        }
    }

    #[tokio::test]
    async fn must_filter_empties_result_set_when_unsatisfiable() {
        let store = Arc::new(StubVectorStore {
            hits: vec![candidate("src/a.rs", "fn retry() {}", 0.9)],
        });
        let changed = Arc::new(ChangedFilesCache::new(Arc::new(NullGit)));
        let pipeline = SearchPipeline::new(store, None, changed, None);
        let outcome = pipeline.search(&make_request("must:NEVER_PRESENT retry")).await;
        assert!(outcome.results.is_empty());
        assert!(outcome.warnings.iter().any(|w| w.starts_with("FILTER_MUST_UNSATISFIED")));
    }

    #[tokio::test]
    async fn plain_query_returns_candidates() {
        let store = Arc::new(StubVectorStore {
            hits: vec![candidate("src/a.rs", "fn retry() {}", 0.9)],
        });
        let changed = Arc::new(ChangedFilesCache::new(Arc::new(NullGit)));
        let pipeline = SearchPipeline::new(store, None, changed, None);
        let outcome = pipeline.search(&make_request("retry loop")).await;
        assert!(!outcome.is_error);
        assert!(!outcome.results.is_empty());
    }

    struct StubOutline {
        has_sidecar: bool,
    }

    #[async_trait]
    impl codelens_domain::ports::OutlineProviderPort for StubOutline {
        async fn has_sidecar(&self, _codebase_root: &Path) -> bool {
            self.has_sidecar
        }
        async fn file_outline(
            &self,
            _codebase_root: &Path,
            _relative_file: &str,
        ) -> Result<Option<codelens_domain::value_objects::FileOutline>> {
            Ok(None)
        }
        async fn call_graph(
            &self,
            _codebase_root: &Path,
            _symbol_ref: &codelens_domain::value_objects::SymbolRef,
            _direction: codelens_domain::value_objects::CallGraphDirection,
            _depth: u8,
            _limit: usize,
        ) -> Result<codelens_domain::value_objects::CallGraphResult> {
            Ok(codelens_domain::value_objects::CallGraphResult { nodes: Vec::new(), edges: Vec::new() })
        }
    }

    #[tokio::test]
    async fn grouped_result_missing_symbol_gets_navigation_fallback() {
        let store = Arc::new(StubVectorStore {
            hits: vec![candidate("src/a.rs", "fn retry() {}", 0.9)],
        });
        let changed = Arc::new(ChangedFilesCache::new(Arc::new(NullGit)));
        let outline: Arc<dyn codelens_domain::ports::OutlineProviderPort> = Arc::new(StubOutline { has_sidecar: true });
        let pipeline = SearchPipeline::new(store, None, changed, Some(outline));

        let mut request = make_request("retry loop");
        request.result_mode = ResultMode::Grouped;
        let outcome = pipeline.search(&request).await;

        let SearchResult::Grouped(group) = outcome.results.first().expect("expected one grouped result") else {
            panic!("expected a grouped result");
        };
        let fallback = group.navigation_fallback.as_ref().expect("candidate has no symbol_id, fallback expected");
        assert_eq!(fallback.relative_file, "src/a.rs");
        assert!(fallback.file_outline_window, "sidecar was present, window should be offered");
    }

    #[tokio::test]
    async fn raw_mode_merges_adjacent_chunks_by_reading_the_union_span_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("a.rs"),
            "line1\nline2\nline3\nline4\nline5\nline6\nline7\nline8\nline9\nline10\n",
        )
        .unwrap();

        let mut first = candidate("a.rs", "line1\nline2\nline3", 0.9);
        first.start_line = 1;
        first.end_line = 3;
        let mut second = candidate("a.rs", "line8\nline9\nline10", 0.5);
        second.start_line = 8;
        second.end_line = 10;

        let store = Arc::new(StubVectorStore { hits: vec![first, second] });
        let changed = Arc::new(ChangedFilesCache::new(Arc::new(NullGit)));
        let pipeline = SearchPipeline::new(store, None, changed, None);

        let mut request = make_request("line");
        request.codebase_root = dir.path().to_path_buf();
        request.result_mode = ResultMode::Raw;
        let outcome = pipeline.search(&request).await;

        let SearchResult::Raw(merged) = outcome.results.first().expect("expected one merged result") else {
            panic!("expected a raw result");
        };
        assert_eq!(merged.start_line, 1);
        assert_eq!(merged.end_line, 10);
        assert_eq!(merged.content, "line1\nline2\nline3\nline4\nline5\nline6\nline7\nline8\nline9\nline10");
    }
}
