//! `search_codebase` tool handler (spec.md §4.4, §6).

use rmcp::ErrorData as McpError;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use validator::Validate;

use codelens_application::search::{SearchOutcome, SearchRequest, SearchResult};
use codelens_application::use_cases::{SearchCodebaseOutcome, SearchCodebaseUseCase};
use codelens_domain::constants::MAX_SEARCH_LIMIT;
use codelens_domain::value_objects::{RankingMode, ResultMode, SearchScope};

use crate::args::SearchCodebaseArgs;
use crate::envelope;

pub struct SearchCodebaseHandler {
    use_case: Arc<SearchCodebaseUseCase>,
}

impl SearchCodebaseHandler {
    pub fn new(use_case: Arc<SearchCodebaseUseCase>) -> Self {
        Self { use_case }
    }

    pub async fn handle(&self, Parameters(args): Parameters<SearchCodebaseArgs>) -> Result<CallToolResult, McpError> {
        if let Err(e) = args.validate() {
            return Err(McpError::invalid_params(format!("invalid arguments: {e}"), None));
        }

        let scope = parse_scope(args.scope.as_deref())
            .map_err(|e| McpError::invalid_params(e, None))?;
        let result_mode = parse_result_mode(args.result_mode.as_deref())
            .map_err(|e| McpError::invalid_params(e, None))?;
        let ranking_mode = parse_ranking_mode(args.ranking_mode.as_deref())
            .map_err(|e| McpError::invalid_params(e, None))?;

        let request = SearchRequest {
            codebase_root: PathBuf::from(&args.path),
            query: args.query.clone(),
            limit: args.limit.min(MAX_SEARCH_LIMIT),
            scope,
            result_mode,
            extension_filter: args.extension_filter.unwrap_or_default(),
            exclude_patterns: args.exclude_patterns.unwrap_or_default(),
            use_reranker: args.use_reranker.unwrap_or(false),
            ranking_mode,
        };

        let outcome = self.use_case.execute(request, args.use_reranker).await;
        match outcome {
            SearchCodebaseOutcome::NotIndexed => envelope::ok(envelope::not_indexed(&args.path, None)),
            SearchCodebaseOutcome::Indexing { percentage } => envelope::ok(envelope::not_ready(&args.path, percentage)),
            SearchCodebaseOutcome::StaleLocal { reason } => envelope::ok(envelope::not_indexed(&args.path, Some(reason))),
            SearchCodebaseOutcome::RequiresReindex { reason } => {
                envelope::ok(envelope::requires_reindex(&args.path, reason))
            }
            SearchCodebaseOutcome::Ok(result) => render_search_outcome(result, result_mode),
        }
    }
}

fn render_search_outcome(outcome: SearchOutcome, result_mode: ResultMode) -> Result<CallToolResult, McpError> {
    if outcome.is_error {
        return envelope::error(json!({
            "status": "error",
            "message": outcome.error_message.unwrap_or_else(|| "search failed".to_string()),
            "warnings": outcome.warnings,
        }));
    }

    let results: Vec<serde_json::Value> = outcome
        .results
        .into_iter()
        .map(|r| match r {
            SearchResult::Raw(candidate) => serde_json::to_value(candidate).unwrap_or_default(),
            SearchResult::Grouped(group) => {
                let mut value = json!({
                    "groupId": group.group_id,
                    "representative": group.representative,
                    "memberCount": group.member_count,
                });
                if let Some(fallback) = group.navigation_fallback {
                    let mut navigation = json!({
                        "message": fallback.message,
                        "context": {
                            "codebaseRoot": fallback.codebase_root,
                            "relativeFile": fallback.relative_file,
                            "absolutePath": fallback.absolute_path,
                        },
                        "readSpan": {
                            "tool": "read_file",
                            "args": {
                                "path": fallback.absolute_path,
                                "start_line": fallback.read_span_start,
                                "end_line": fallback.read_span_end,
                            },
                        },
                    });
                    if fallback.file_outline_window {
                        navigation["fileOutlineWindow"] = json!({
                            "tool": "file_outline",
                            "args": {"path": fallback.codebase_root, "file": fallback.relative_file},
                        });
                    }
                    value["navigationFallback"] = navigation;
                }
                value
            }
        })
        .collect();

    let mut hints = json!({"version": 1});
    if let Some(noise) = outcome.noise_mitigation {
        hints["noiseMitigation"] = json!({
            "reason": noise.reason,
            "topK": noise.top_k,
            "ratios": {
                "tests": noise.ratios.tests,
                "fixtures": noise.ratios.fixtures,
                "docs": noise.ratios.docs,
                "generated": noise.ratios.generated,
                "runtime": noise.ratios.runtime,
            },
            "recommendedScope": noise.recommended_scope,
            "debounceMs": noise.debounce_ms,
            "suggestedIgnorePatterns": noise.suggested_ignore_patterns,
            "nextStep": noise.next_step,
        });
    }

    let result_mode_label = match result_mode {
        ResultMode::Raw => "raw",
        ResultMode::Grouped => "grouped",
    };

    envelope::ok(json!({
        "status": "ok",
        "resultMode": result_mode_label,
        "results": results,
        "warnings": outcome.warnings,
        "rerank": {
            "enabled": outcome.rerank.enabled,
            "attempted": outcome.rerank.attempted,
            "applied": outcome.rerank.applied,
            "errorCode": outcome.rerank.error_code,
        },
        "hints": hints,
    }))
}

fn parse_scope(raw: Option<&str>) -> Result<SearchScope, String> {
    match raw {
        None => Ok(SearchScope::Mixed),
        Some("runtime") => Ok(SearchScope::Runtime),
        Some("docs") => Ok(SearchScope::Docs),
        Some("mixed") => Ok(SearchScope::Mixed),
        Some(other) => Err(format!("unknown scope '{other}'")),
    }
}

fn parse_result_mode(raw: Option<&str>) -> Result<ResultMode, String> {
    match raw {
        None => Ok(ResultMode::Raw),
        Some("raw") => Ok(ResultMode::Raw),
        Some("grouped") => Ok(ResultMode::Grouped),
        Some(other) => Err(format!("unknown resultMode '{other}'")),
    }
}

fn parse_ranking_mode(raw: Option<&str>) -> Result<RankingMode, String> {
    match raw {
        None => Ok(RankingMode::Default),
        Some("default") => Ok(RankingMode::Default),
        Some("auto_changed_first") => Ok(RankingMode::AutoChangedFirst),
        Some(other) => Err(format!("unknown rankingMode '{other}'")),
    }
}
