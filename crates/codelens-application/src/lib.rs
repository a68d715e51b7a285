//! Application layer for Codelens.
//!
//! Orchestrates the domain ports into the coordinator's core behavior: the
//! snapshot store, the freshness coordinator, the search pipeline, capability
//! resolution, and one use case per tool. Depends only on `codelens-domain`;
//! concrete collaborator adapters are wired in by the binary crate.

pub mod capability;
pub mod freshness;
pub mod search;
pub mod snapshot;
pub mod use_cases;
