//! Ignore matcher port — glob/gitignore-style path matching, composed from
//! base patterns plus a codebase's repo control files (spec.md §2 IgnoreMatcher).

/// A compiled ignore matcher for one codebase.
pub trait IgnoreMatcherPort: Send + Sync {
    /// Whether the given relative path is ignored. Callers should check both
    /// `p` and `p/` for paths that might be directories (spec.md §4.3).
    fn is_ignored(&self, relative_path: &str) -> bool;
}

/// Factory for building an [`IgnoreMatcherPort`] for a codebase from its
/// current root-level control files plus any extra patterns supplied at
/// `manage_index create` time.
pub trait IgnoreMatcherFactory: Send + Sync {
    /// Build a matcher for `codebase_root`, optionally seeded with extra
    /// patterns supplied by the caller.
    fn build(
        &self,
        codebase_root: &std::path::Path,
        extra_patterns: &[String],
    ) -> Box<dyn IgnoreMatcherPort>;
}
