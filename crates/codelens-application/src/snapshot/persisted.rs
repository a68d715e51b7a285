//! On-disk shape of the snapshot file (spec.md §6 "Persistence").

use codelens_domain::value_objects::CodebaseInfo;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Current snapshot file format version.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// The key the snapshot blob is stored under in the [`codelens_domain::ports::StateStoreProvider`].
pub const SNAPSHOT_STATE_KEY: &str = "codebase_snapshot";

/// Top-level persisted document. Unknown extra fields are tolerated on load
/// (spec.md §4.1 `load()`) because `serde` ignores unrecognized keys by default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedSnapshot {
    /// Format version, for forward migrations
    #[serde(default = "default_version")]
    pub version: u32,
    /// Codebase path (string form, for JSON map keys) to its tracked info
    pub codebases: HashMap<String, CodebaseInfo>,
}

fn default_version() -> u32 {
    SNAPSHOT_FORMAT_VERSION
}

impl Default for PersistedSnapshot {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_FORMAT_VERSION,
            codebases: HashMap::new(),
        }
    }
}

impl PersistedSnapshot {
    /// Build from the in-memory map, keying by the path's string form.
    pub fn from_map(map: &HashMap<PathBuf, CodebaseInfo>) -> Self {
        Self {
            version: SNAPSHOT_FORMAT_VERSION,
            codebases: map
                .iter()
                .map(|(path, info)| (path.to_string_lossy().to_string(), info.clone()))
                .collect(),
        }
    }

    /// Rehydrate the in-memory map, clamping any entry whose status failed to
    /// parse as an unknown enum tag to `indexfailed` (spec.md §4.1 `load()`).
    ///
    /// Because `serde`'s adjacently/internally tagged enum deserialization
    /// fails the whole document on an unrecognized tag rather than clamping a
    /// single field, unknown-status clamping is handled by the caller
    /// examining raw JSON before full deserialization; this method assumes
    /// `self` already deserialized successfully.
    pub fn into_map(self) -> HashMap<PathBuf, CodebaseInfo> {
        self.codebases
            .into_iter()
            .map(|(path, info)| (PathBuf::from(path), info))
            .collect()
    }
}
