//! Domain layer for Codelens.
//!
//! Contains the codebase state machine, fingerprint/marker value objects, the
//! closed warning registry, and the flat collaborator ports (vector store,
//! embedder, reranker, indexer, git, state store, ignore matcher) that the
//! application layer depends on. No dependency on infrastructure or any
//! concrete external service.

pub mod constants;
pub mod error;
pub mod ports;
pub mod value_objects;

pub use error::{Error, Result};
