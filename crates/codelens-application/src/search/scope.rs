//! Scope filter classifiers (spec.md §4.4 "Scope filter").

use codelens_domain::value_objects::SearchScope;

const TEST_GLOBS: &[&str] = &["**/*.test.*", "**/*.spec.*", "**/__tests__/**"];
const FIXTURE_GLOBS: &[&str] = &["**/__fixtures__/**", "**/fixtures/**"];
const DOCS_GLOBS: &[&str] = &["docs/**", "**/*.md"];
const GENERATED_GLOBS: &[&str] = &["coverage/**"];

fn glob_match(pattern: &str, relative_path: &str) -> bool {
    glob::Pattern::new(pattern)
        .map(|p| p.matches(relative_path))
        .unwrap_or(false)
}

/// Whether `relative_path` matches the `tests` classifier.
pub fn is_test_path(relative_path: &str) -> bool {
    TEST_GLOBS.iter().any(|g| glob_match(g, relative_path))
}

/// Whether `relative_path` matches the `fixtures` classifier.
pub fn is_fixture_path(relative_path: &str) -> bool {
    FIXTURE_GLOBS.iter().any(|g| glob_match(g, relative_path))
}

/// Whether `relative_path` matches the `docs` classifier.
pub fn is_docs_path(relative_path: &str) -> bool {
    DOCS_GLOBS.iter().any(|g| glob_match(g, relative_path))
}

/// Whether `relative_path` matches the `generated` classifier.
pub fn is_generated_path(relative_path: &str) -> bool {
    GENERATED_GLOBS.iter().any(|g| glob_match(g, relative_path))
}

/// Whether `relative_path` is excluded by any of the four non-runtime classifiers.
pub fn is_non_runtime_path(relative_path: &str) -> bool {
    is_test_path(relative_path)
        || is_fixture_path(relative_path)
        || is_docs_path(relative_path)
        || is_generated_path(relative_path)
}

/// Whether a candidate at `relative_path` should be kept under `scope`.
pub fn keep_under_scope(scope: SearchScope, relative_path: &str) -> bool {
    match scope {
        SearchScope::Runtime => !is_non_runtime_path(relative_path),
        SearchScope::Docs => is_docs_path(relative_path) || is_test_path(relative_path),
        SearchScope::Mixed => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runtime_scope_excludes_tests_and_docs() {
        assert!(!keep_under_scope(SearchScope::Runtime, "src/foo.test.ts"));
        assert!(!keep_under_scope(SearchScope::Runtime, "docs/readme.md"));
        assert!(keep_under_scope(SearchScope::Runtime, "src/foo.ts"));
    }

    #[test]
    fn docs_scope_keeps_only_docs_and_tests() {
        assert!(keep_under_scope(SearchScope::Docs, "docs/readme.md"));
        assert!(keep_under_scope(SearchScope::Docs, "src/foo.test.ts"));
        assert!(!keep_under_scope(SearchScope::Docs, "src/foo.ts"));
    }

    #[test]
    fn mixed_scope_keeps_everything() {
        assert!(keep_under_scope(SearchScope::Mixed, "src/foo.test.ts"));
    }
}
