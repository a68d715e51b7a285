//! Infrastructure adapters for Codelens: configuration, file-backed state
//! persistence, ignore matching, and filesystem watching. Depends on
//! `codelens-domain` for ports/types and `codelens-application` for the
//! collaborators the watcher drives (`FreshnessCoordinator`, `SnapshotStore`).

pub mod config;
pub mod ignore_matcher;
pub mod logging;
pub mod state_store;
pub mod watcher;
