//! Collaborator ports — the flat interfaces at the edges of the domain
//! (spec.md §9 "Deep inheritance → flat component interfaces").

pub mod embedder;
pub mod git;
pub mod ignore;
pub mod indexer;
pub mod outline;
pub mod reranker;
pub mod state_store;
pub mod vector_store;

pub use embedder::EmbedderPort;
pub use git::GitStatusPort;
pub use ignore::{IgnoreMatcherFactory, IgnoreMatcherPort};
pub use indexer::{IndexOutcome, IndexerPort, ProgressCallback, ReindexOutcome, snapshot_dir_for};
pub use outline::OutlineProviderPort;
pub use reranker::RerankerPort;
pub use state_store::StateStoreProvider;
pub use vector_store::{HybridSearchOptions, HybridSearchRequest, VectorStorePort};
