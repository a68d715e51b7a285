//! Collaborator adapters for Codelens: the default, dependency-free
//! implementations of the external ports (`codelens_domain::ports`) a real
//! deployment would point at a vector database, an embedding model, a
//! reranking service, an AST-aware indexer, git, and a symbol sidecar.
//! Grounded on the teacher's `src/adapters/providers` tree — one module per
//! collaborator, each implementing exactly one port trait.

pub mod embedding;
pub mod git;
pub mod indexer;
pub mod outline;
pub mod reranker;
pub mod vector_store;
