//! `.gitignore`-style matcher built from a codebase's root-level ignore
//! control files (`.satoriignore`, `.gitignore`) plus extra patterns supplied
//! at `manage_index create` time (spec.md §2 IgnoreMatcher, §4.2.c).
//!
//! Nested `.gitignore` files are never consulted — only root-level control
//! files feed the matcher, matching the ignore-control-signature scope.

use codelens_domain::constants::IGNORE_CONTROL_FILES;
use codelens_domain::ports::{IgnoreMatcherFactory, IgnoreMatcherPort};
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::Path;

/// A compiled root-level ignore matcher for one codebase.
pub struct GlobIgnoreMatcher {
    inner: Gitignore,
}

impl IgnoreMatcherPort for GlobIgnoreMatcher {
    fn is_ignored(&self, relative_path: &str) -> bool {
        self.inner.matched(relative_path, relative_path.ends_with('/')).is_ignore()
    }
}

/// Builds a [`GlobIgnoreMatcher`] from a codebase root's control files.
#[derive(Default)]
pub struct GlobIgnoreMatcherFactory;

impl IgnoreMatcherFactory for GlobIgnoreMatcherFactory {
    fn build(&self, codebase_root: &Path, extra_patterns: &[String]) -> Box<dyn IgnoreMatcherPort> {
        let mut builder = GitignoreBuilder::new(codebase_root);

        for filename in IGNORE_CONTROL_FILES {
            let path = codebase_root.join(filename);
            if path.exists() {
                if let Some(err) = builder.add(&path) {
                    tracing::warn!(file = filename, error = %err, "[IGNORE] failed to parse control file");
                }
            }
        }

        for pattern in extra_patterns {
            if let Err(err) = builder.add_line(None, pattern) {
                tracing::warn!(pattern, error = %err, "[IGNORE] invalid extra pattern, skipped");
            }
        }

        let inner = builder.build().unwrap_or_else(|err| {
            tracing::error!(error = %err, "[IGNORE] failed to build matcher, falling back to empty");
            Gitignore::empty()
        });

        Box::new(GlobIgnoreMatcher { inner })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_gitignore_patterns() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".gitignore"), "node_modules/\n*.log\n").unwrap();

        let matcher = GlobIgnoreMatcherFactory.build(dir.path(), &[]);
        assert!(matcher.is_ignored("node_modules/"));
        assert!(matcher.is_ignored("debug.log"));
        assert!(!matcher.is_ignored("src/main.rs"));
    }

    #[test]
    fn extra_patterns_are_merged() {
        let dir = tempfile::tempdir().unwrap();
        let matcher = GlobIgnoreMatcherFactory.build(dir.path(), &["*.generated.ts".to_string()]);
        assert!(matcher.is_ignored("schema.generated.ts"));
        assert!(!matcher.is_ignored("schema.ts"));
    }

    #[test]
    fn missing_control_files_yield_an_empty_matcher() {
        let dir = tempfile::tempdir().unwrap();
        let matcher = GlobIgnoreMatcherFactory.build(dir.path(), &[]);
        assert!(!matcher.is_ignored("anything.rs"));
    }
}
