//! Noise-mitigation hint (spec.md §4.4 "Noise-mitigation hint").

use super::grouping::GroupedResult;
use super::scope::{is_docs_path, is_fixture_path, is_generated_path, is_test_path};
use codelens_domain::constants::DEFAULT_WATCH_DEBOUNCE_MS;

/// Fixed suggestion list surfaced alongside a noise-mitigation hint.
pub const SUGGESTED_IGNORE_PATTERNS: &[&str] = &[
    "**/*.test.*",
    "**/*.spec.*",
    "**/__tests__/**",
    "**/__fixtures__/**",
    "**/fixtures/**",
    "coverage/**",
];

/// One classifier's share of the inspected top-K window.
#[derive(Debug, Clone)]
pub struct NoiseRatios {
    pub tests: f32,
    pub fixtures: f32,
    pub docs: f32,
    pub generated: f32,
    pub runtime: f32,
}

/// The `hints.noiseMitigation` payload.
#[derive(Debug, Clone)]
pub struct NoiseMitigationHint {
    pub reason: &'static str,
    pub top_k: usize,
    pub ratios: NoiseRatios,
    pub recommended_scope: &'static str,
    pub debounce_ms: u64,
    pub suggested_ignore_patterns: Vec<&'static str>,
    pub next_step: String,
}

/// Compute the noise-mitigation hint (if triggered) over the top
/// `min(5, limit)` grouped results.
pub fn evaluate_noise(grouped: &[GroupedResult], limit: usize) -> Option<NoiseMitigationHint> {
    let top_k = grouped.len().min(limit.min(5));
    if top_k == 0 {
        return None;
    }
    let window = &grouped[..top_k];

    let mut tests = 0usize;
    let mut fixtures = 0usize;
    let mut docs = 0usize;
    let mut generated = 0usize;
    let mut runtime = 0usize;
    for group in window {
        let path = group.representative.relative_path.as_str();
        if is_test_path(path) {
            tests += 1;
        } else if is_fixture_path(path) {
            fixtures += 1;
        } else if is_docs_path(path) {
            docs += 1;
        } else if is_generated_path(path) {
            generated += 1;
        } else {
            runtime += 1;
        }
    }

    let n = top_k as f32;
    let ratios = NoiseRatios {
        tests: tests as f32 / n,
        fixtures: fixtures as f32 / n,
        docs: docs as f32 / n,
        generated: generated as f32 / n,
        runtime: runtime as f32 / n,
    };
    let non_runtime = ratios.tests + ratios.fixtures + ratios.docs + ratios.generated;

    if ratios.runtime > 0.4 || non_runtime < 0.6 {
        return None;
    }

    Some(NoiseMitigationHint {
        reason: "top_results_noise_dominant",
        top_k,
        ratios,
        recommended_scope: "runtime",
        debounce_ms: DEFAULT_WATCH_DEBOUNCE_MS,
        suggested_ignore_patterns: SUGGESTED_IGNORE_PATTERNS.to_vec(),
        next_step: "re-run search_codebase with scope=\"runtime\", or call manage_index with \
            action=\"sync\" if the ignore rules just changed"
            .to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use codelens_domain::value_objects::SearchCandidate;

    fn grouped_at(path: &str, score: f32) -> GroupedResult {
        GroupedResult {
            group_id: path.to_string(),
            representative: SearchCandidate {
                relative_path: path.to_string(),
                start_line: 1,
                end_line: 2,
                content: String::new(),
                score,
                symbol_id: None,
                symbol_label: None,
                breadcrumbs: Vec::new(),
            },
            member_count: 1,
            navigation_fallback: None,
        }
    }

    #[test]
    fn emits_hint_when_runtime_share_is_low() {
        let grouped = vec![
            grouped_at("src/a.test.ts", 0.9),
            grouped_at("__fixtures__/b.ts", 0.8),
            grouped_at("docs/c.md", 0.7),
            grouped_at("coverage/d.html", 0.6),
            grouped_at("src/e.ts", 0.5),
        ];
        let hint = evaluate_noise(&grouped, 5).expect("hint should fire");
        assert_eq!(hint.reason, "top_results_noise_dominant");
        assert_eq!(hint.top_k, 5);
        assert!((hint.ratios.runtime - 0.2).abs() < f32::EPSILON);
    }

    #[test]
    fn no_hint_when_runtime_dominant() {
        let grouped = vec![
            grouped_at("src/a.ts", 0.9),
            grouped_at("src/b.ts", 0.8),
            grouped_at("src/c.ts", 0.7),
        ];
        assert!(evaluate_noise(&grouped, 5).is_none());
    }
}
