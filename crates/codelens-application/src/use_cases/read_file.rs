//! `read_file` use case (spec.md §6). Direct filesystem read; no freshness or
//! snapshot involvement — the tool is a thin pass-through for an agent that
//! already has a relative path/line range from a search or outline result.

use codelens_domain::error::{Error, Result};
use std::path::Path;

pub struct ReadFileUseCase;

impl ReadFileUseCase {
    pub fn new() -> Self {
        Self
    }

    pub async fn execute(&self, path: &Path) -> Result<String> {
        if !path.is_absolute() {
            return Err(Error::invalid_argument("read_file requires an absolute path"));
        }
        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::io_with_source(format!("failed to read {}", path.display()), e))
    }
}

impl Default for ReadFileUseCase {
    fn default() -> Self {
        Self::new()
    }
}
