//! Git collaborator port — used only for the changed-files ranking boost.

use async_trait::async_trait;

/// Thin contract over `git status`, used by the changed-files-first ranking boost.
#[async_trait]
pub trait GitStatusPort: Send + Sync {
    /// Relative paths of tracked files with pending changes in `codebase_root`,
    /// ignoring untracked entries. Returns `Err` on any failure (not a git repo,
    /// subprocess failure, etc.) so the caller can fall back to cached state.
    async fn changed_tracked_files(
        &self,
        codebase_root: &std::path::Path,
    ) -> Result<Vec<String>, crate::error::Error>;
}
