//! Search-related value objects shared between the search pipeline and the
//! vector-store / reranker collaborator ports.

use serde::{Deserialize, Serialize};

/// `scope` argument of `search_codebase`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchScope {
    /// Exclude tests, fixtures, docs, and generated files.
    Runtime,
    /// Keep only docs and tests.
    Docs,
    /// No classifier-based exclusion.
    #[default]
    Mixed,
}

/// `resultMode` argument of `search_codebase`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultMode {
    /// Ungrouped, per-chunk results (after adjacent-chunk merging).
    #[default]
    Raw,
    /// Results grouped by symbol with diversity clamps.
    Grouped,
}

/// `rankingMode` argument of `search_codebase`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingMode {
    /// Plain relevance order.
    #[default]
    Default,
    /// Boost candidates whose relative path is in the current changed-files set.
    AutoChangedFirst,
}

/// A single `op:value` or `op:"quoted value"` token parsed from the first
/// logical line of a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOperator {
    /// `lang:value` — restrict to a language
    Lang(String),
    /// `path:value` — restrict to a path glob
    Path(String),
    /// `must:value` — every result's content must contain this token
    Must(String),
    /// `exclude:value` — exclude paths matching this glob
    Exclude(String),
}

/// Result of parsing the operator line off a raw query string.
#[derive(Debug, Clone, Default)]
pub struct ParsedQuery {
    /// The semantic query with the operator line stripped
    pub semantic_query: String,
    /// Operators recognized on the first logical line, in encounter order
    pub operators: Vec<QueryOperator>,
}

impl ParsedQuery {
    /// All `must:` operator values, in encounter order.
    pub fn must_tokens(&self) -> Vec<&str> {
        self.operators
            .iter()
            .filter_map(|op| match op {
                QueryOperator::Must(v) => Some(v.as_str()),
                _ => None,
            })
            .collect()
    }

    /// All `exclude:` operator values, in encounter order.
    pub fn exclude_globs(&self) -> Vec<&str> {
        self.operators
            .iter()
            .filter_map(|op| match op {
                QueryOperator::Exclude(v) => Some(v.as_str()),
                _ => None,
            })
            .collect()
    }

    /// All `lang:` operator values, in encounter order.
    pub fn lang_filters(&self) -> Vec<&str> {
        self.operators
            .iter()
            .filter_map(|op| match op {
                QueryOperator::Lang(v) => Some(v.as_str()),
                _ => None,
            })
            .collect()
    }

    /// All `path:` operator values, in encounter order.
    pub fn path_filters(&self) -> Vec<&str> {
        self.operators
            .iter()
            .filter_map(|op| match op {
                QueryOperator::Path(v) => Some(v.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// One semantic-search hit returned by a vector-store hybrid search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchCandidate {
    /// Relative path within the codebase
    pub relative_path: String,
    /// 1-based inclusive start line
    pub start_line: u32,
    /// 1-based inclusive end line
    pub end_line: u32,
    /// Chunk content
    pub content: String,
    /// Raw relevance score from the vector store (higher is better)
    pub score: f32,
    /// Stable symbol identifier, if the chunk maps to one symbol
    pub symbol_id: Option<String>,
    /// Human-readable symbol label (e.g. `ClassName.method`)
    pub symbol_label: Option<String>,
    /// Breadcrumb path components (outer to inner scope)
    pub breadcrumbs: Vec<String>,
}

/// Which of the two concurrent semantic passes a candidate (or failure) came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPass {
    /// The original query plus filters.
    Primary,
    /// The query suffixed with the fixed expansion token set.
    Expanded,
}

impl SearchPass {
    /// Stable identifier used in `SEARCH_PASS_FAILED:<passId>` warnings.
    pub fn id(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Expanded => "expanded",
        }
    }
}

/// Fixed expansion token set appended to the `expanded` pass query.
pub const SEARCH_EXPANSION_TOKENS: &str = "implementation runtime source entrypoint";
