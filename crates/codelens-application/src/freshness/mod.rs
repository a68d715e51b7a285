//! The sync gate every tool call funnels through (spec.md §4.2).

mod coordinator;
mod debounce;
mod periodic;
mod signature;
mod types;

pub use coordinator::{FreshnessCoordinator, SyncCompletedHook};
pub use debounce::Debouncer;
pub use periodic::PeriodicSync;
pub use signature::compute_ignore_control_signature;
pub use types::{EnsureFreshnessOptions, FreshnessDecision, FreshnessMode, FreshnessReason};
