//! Warning registry — the closed set of stable warning codes an envelope may carry.
//!
//! Warnings surfaced in a tool envelope are plain strings whose prefix is one of these
//! registered codes; set membership (not string equality) determines validity, since
//! several codes carry a dynamic suffix (e.g. `SEARCH_PASS_FAILED:expanded — ...`).

/// A single registered warning code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarningCode {
    /// One of the two concurrent search passes failed; the other's results were kept.
    SearchPassFailed,
    /// All semantic search passes failed.
    AllPassesFailed,
    /// A `must:` operator could not be satisfied after bounded retries.
    FilterMustUnsatisfied,
    /// The reranker was attempted but failed; results were returned unreranked.
    RerankerFailed,
}

impl WarningCode {
    /// The stable string prefix this code is registered under.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::SearchPassFailed => "SEARCH_PASS_FAILED",
            Self::AllPassesFailed => "ALL_PASSES_FAILED",
            Self::FilterMustUnsatisfied => "FILTER_MUST_UNSATISFIED",
            Self::RerankerFailed => "RERANKER_FAILED",
        }
    }

    /// All registered codes, for membership checks.
    pub const ALL: &'static [WarningCode] = &[
        Self::SearchPassFailed,
        Self::AllPassesFailed,
        Self::FilterMustUnsatisfied,
        Self::RerankerFailed,
    ];
}

/// Closed registry of warning codes. Validates that an emitted warning string
/// carries a registered prefix.
pub struct WarningRegistry;

impl WarningRegistry {
    /// Build the full warning string for a code, with an optional dynamic suffix.
    pub fn format(code: WarningCode, detail: Option<&str>) -> String {
        match detail {
            Some(detail) if !detail.is_empty() => format!("{}:{}", code.prefix(), detail),
            _ => code.prefix().to_string(),
        }
    }

    /// Whether `warning` carries a prefix from the closed set.
    pub fn is_registered(warning: &str) -> bool {
        WarningCode::ALL
            .iter()
            .any(|code| warning.starts_with(code.prefix()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_and_without_detail() {
        assert_eq!(
            WarningRegistry::format(WarningCode::FilterMustUnsatisfied, None),
            "FILTER_MUST_UNSATISFIED"
        );
        assert_eq!(
            WarningRegistry::format(WarningCode::SearchPassFailed, Some("expanded — timeout")),
            "SEARCH_PASS_FAILED:expanded — timeout"
        );
    }

    #[test]
    fn registry_membership() {
        assert!(WarningRegistry::is_registered("FILTER_MUST_UNSATISFIED"));
        assert!(WarningRegistry::is_registered(
            "SEARCH_PASS_FAILED:expanded — boom"
        ));
        assert!(!WarningRegistry::is_registered("NOT_A_REAL_CODE"));
    }
}
