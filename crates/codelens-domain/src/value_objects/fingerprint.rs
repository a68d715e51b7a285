//! Index fingerprint — identifies which embedding/vector-store generation produced an index.

use serde::{Deserialize, Serialize};

/// Compact tuple identifying the embedding provider/model/dimension and vector-store schema
/// that produced an index. Two fingerprints are mutually usable iff field-wise equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexFingerprint {
    /// Name of the embedding provider (e.g. "openai", "fastembed")
    pub embedding_provider: String,
    /// Name of the embedding model
    pub embedding_model: String,
    /// Embedding vector dimension
    pub embedding_dimension: i64,
    /// Name of the vector store provider (e.g. "milvus", "in-memory")
    pub vector_store_provider: String,
    /// Schema version of the vector store collection layout
    pub schema_version: String,
}

/// How a fingerprint on a `CodebaseInfo` was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FingerprintSource {
    /// Confirmed by reading the completion marker document in the vector store
    Verified,
    /// Not yet confirmed against the vector store; assumed from the last successful index
    Assumed,
}
