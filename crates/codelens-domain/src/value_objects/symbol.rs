//! Symbol and call-graph value objects used by `file_outline` and `call_graph`.

use serde::{Deserialize, Serialize};

/// One symbol entry in a file's outline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlineSymbol {
    pub symbol_id: String,
    pub label: String,
    pub kind: String,
    pub start_line: u32,
    pub end_line: u32,
}

/// A file's symbol outline, as produced by the out-of-scope indexing pipeline's
/// AST sidecar.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileOutline {
    pub symbols: Vec<OutlineSymbol>,
    /// Sidecar schema version; `file_outline`'s `fileOutlineWindow` hint is only
    /// attached when this matches the version the search pipeline expects.
    pub sidecar_version: u32,
}

/// `call_graph.symbolRef` argument.
#[derive(Debug, Clone)]
pub struct SymbolRef {
    pub file: String,
    pub symbol_id: Option<String>,
    pub symbol_label: Option<String>,
}

/// `call_graph.direction` argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallGraphDirection {
    Callers,
    Callees,
    Both,
}

/// One node in a call-graph traversal result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallGraphNode {
    pub symbol_id: String,
    pub label: String,
    pub file: String,
}

/// One directed edge in a call-graph traversal result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum EdgeDirection {
    Calls,
    CalledBy,
}

/// One edge in a call-graph traversal result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallGraphEdge {
    pub source: String,
    pub target: String,
    pub direction: EdgeDirection,
}

/// Result of a bounded BFS call-graph traversal (spec.md §9 "tagged edges +
/// arena-like node table").
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallGraphResult {
    pub nodes: Vec<CallGraphNode>,
    pub edges: Vec<CallGraphEdge>,
}
