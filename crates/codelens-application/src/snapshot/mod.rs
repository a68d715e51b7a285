//! The durable snapshot store (spec.md §4.1).

mod persisted;
mod store;

pub use persisted::{PersistedSnapshot, SNAPSHOT_FORMAT_VERSION, SNAPSHOT_STATE_KEY};
pub use store::{FingerprintGateResult, SnapshotStore};
