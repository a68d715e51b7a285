//! Ignore-control signature (spec.md §4.2.c).

use codelens_domain::constants::IGNORE_CONTROL_FILES;
use std::path::Path;
use std::time::UNIX_EPOCH;

/// Deterministic string built from each recognized root-level control file as
/// `name:mtimeMsRounded:size`, joined by `|`, with `name:missing` for absent
/// files. Only root-level files are consulted; nested `.gitignore` files never
/// contribute.
pub async fn compute_ignore_control_signature(codebase_root: &Path) -> String {
    let mut parts = Vec::with_capacity(IGNORE_CONTROL_FILES.len());
    for name in IGNORE_CONTROL_FILES {
        let candidate = codebase_root.join(name);
        match tokio::fs::metadata(&candidate).await {
            Ok(meta) => {
                let mtime_ms = meta
                    .modified()
                    .ok()
                    .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                    .map(|d| d.as_millis())
                    .unwrap_or(0);
                parts.push(format!("{name}:{mtime_ms}:{}", meta.len()));
            }
            Err(_) => parts.push(format!("{name}:missing")),
        }
    }
    parts.join("|")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_files_produce_stable_signature() {
        let dir = tempfile::tempdir().unwrap();
        let sig = compute_ignore_control_signature(dir.path()).await;
        assert_eq!(sig, ".satoriignore:missing|.gitignore:missing");
    }

    #[tokio::test]
    async fn present_file_changes_signature() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join(".gitignore"), b"node_modules/\n")
            .await
            .unwrap();
        let sig = compute_ignore_control_signature(dir.path()).await;
        assert!(sig.starts_with(".satoriignore:missing|.gitignore:"));
        assert!(!sig.ends_with(":missing"));
    }
}
