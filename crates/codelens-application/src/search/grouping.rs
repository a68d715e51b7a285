//! Grouping by symbol, diversity clamp, and adjacent-chunk merging
//! (spec.md §4.4 "Grouping", "Diversity clamp", "Merging adjacent chunks").

use codelens_domain::constants::{ADJACENT_CHUNK_MERGE_WINDOW_LINES, DIVERSITY_MAX_PER_FILE, DIVERSITY_MAX_PER_SYMBOL};
use codelens_domain::value_objects::SearchCandidate;
use sha2::{Digest, Sha256};
use std::cmp::Ordering;
use std::collections::HashMap;

/// One grouped result: a representative candidate plus its stable group id.
#[derive(Debug, Clone)]
pub struct GroupedResult {
    /// Stable id: the `symbolId` when present, else `grp_<16-hex>`.
    pub group_id: String,
    /// The highest-score candidate in the group (after rerank, if applied).
    pub representative: SearchCandidate,
    /// Number of candidates folded into this group.
    pub member_count: usize,
    /// Set when the representative has no stable `symbolId`, pointing the
    /// caller at `read_file`/`file_outline` instead (spec.md §4.4 "Navigation
    /// fallback").
    pub navigation_fallback: Option<NavigationFallback>,
}

/// Attached to a grouped result whose representative has no stable symbol
/// id, so a caller can still navigate to the match.
#[derive(Debug, Clone)]
pub struct NavigationFallback {
    pub message: String,
    pub codebase_root: String,
    pub relative_file: String,
    pub absolute_path: String,
    pub read_span_start: u32,
    pub read_span_end: u32,
    /// Whether a call-graph sidecar of compatible version is present, so the
    /// caller may additionally try `file_outline` around this span.
    pub file_outline_window: bool,
}

/// Deterministic fallback group id derived from `(file, startLine, endLine, content)`.
pub fn fallback_group_id(candidate: &SearchCandidate) -> String {
    let mut hasher = Sha256::new();
    hasher.update(candidate.relative_path.as_bytes());
    hasher.update(candidate.start_line.to_le_bytes());
    hasher.update(candidate.end_line.to_le_bytes());
    hasher.update(candidate.content.as_bytes());
    let digest = hasher.finalize();
    format!("grp_{}", hex_prefix(&digest, 16))
}

fn hex_prefix(bytes: &[u8], hex_chars: usize) -> String {
    let mut out = String::with_capacity(hex_chars);
    for byte in bytes {
        if out.len() >= hex_chars {
            break;
        }
        out.push_str(&format!("{byte:02x}"));
    }
    out.truncate(hex_chars);
    out
}

fn group_key(candidate: &SearchCandidate) -> String {
    match &candidate.symbol_id {
        Some(id) => id.clone(),
        None => fallback_group_id(candidate),
    }
}

/// Group `candidates` by `(file, symbolId)` (or the fallback hash id), keeping
/// the highest-score candidate per group as the representative, then apply
/// the diversity clamp (`maxPerFile`, `maxPerSymbol`) and the deterministic
/// sort order.
pub fn group_and_clamp(mut candidates: Vec<SearchCandidate>) -> Vec<GroupedResult> {
    candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

    let mut groups: HashMap<String, GroupedResult> = HashMap::new();
    let mut order: Vec<String> = Vec::new();
    for candidate in candidates {
        let key = group_key(&candidate);
        match groups.get_mut(&key) {
            Some(existing) => {
                existing.member_count += 1;
                if candidate.score > existing.representative.score {
                    existing.representative = candidate;
                }
            }
            None => {
                order.push(key.clone());
                groups.insert(
                    key.clone(),
                    GroupedResult {
                        group_id: key,
                        representative: candidate,
                        member_count: 1,
                        navigation_fallback: None,
                    },
                );
            }
        }
    }

    let mut ordered: Vec<GroupedResult> = order.into_iter().filter_map(|k| groups.remove(&k)).collect();
    ordered.sort_by(sort_groups);

    let mut per_file: HashMap<String, usize> = HashMap::new();
    let mut per_symbol: HashMap<String, usize> = HashMap::new();
    ordered.retain(|group| {
        let file_count = per_file.entry(group.representative.relative_path.clone()).or_insert(0);
        if *file_count >= DIVERSITY_MAX_PER_FILE {
            return false;
        }
        if let Some(symbol_id) = &group.representative.symbol_id {
            let symbol_count = per_symbol.entry(symbol_id.clone()).or_insert(0);
            if *symbol_count >= DIVERSITY_MAX_PER_SYMBOL {
                return false;
            }
            *symbol_count += 1;
        }
        *file_count += 1;
        true
    });

    ordered
}

fn sort_groups(a: &GroupedResult, b: &GroupedResult) -> Ordering {
    b.representative
        .score
        .partial_cmp(&a.representative.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.representative.relative_path.cmp(&b.representative.relative_path))
        .then_with(|| a.representative.start_line.cmp(&b.representative.start_line))
        .then_with(|| {
            match (&a.representative.symbol_label, &b.representative.symbol_label) {
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                _ => a
                    .representative
                    .symbol_id
                    .cmp(&b.representative.symbol_id),
            }
        })
}

/// Merge adjacent same-file candidates whose line ranges are within
/// [`ADJACENT_CHUNK_MERGE_WINDOW_LINES`] and whose breadcrumb tails match.
/// Used in raw (non-grouped) result mode; content for the merged span is
/// supplied by `read_span`, a closure reading disk content for a line range,
/// falling back to the joined snippets with a gap marker on read failure.
pub fn merge_adjacent_chunks(
    mut candidates: Vec<SearchCandidate>,
    mut read_span: impl FnMut(&str, u32, u32) -> Option<String>,
) -> Vec<SearchCandidate> {
    candidates.sort_by(|a, b| {
        a.relative_path
            .cmp(&b.relative_path)
            .then_with(|| a.start_line.cmp(&b.start_line))
    });

    let mut merged: Vec<SearchCandidate> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if let Some(last) = merged.last_mut() {
            if last.relative_path == candidate.relative_path
                && breadcrumb_tail(&last.breadcrumbs) == breadcrumb_tail(&candidate.breadcrumbs)
                && candidate.start_line.saturating_sub(last.end_line) <= ADJACENT_CHUNK_MERGE_WINDOW_LINES
            {
                let new_end = candidate.end_line.max(last.end_line);
                last.content = read_span(&last.relative_path, last.start_line, new_end).unwrap_or_else(|| {
                    format!("{}\n\n... (gap) ...\n\n{}", last.content, candidate.content)
                });
                last.end_line = new_end;
                last.score = last.score.max(candidate.score);
                continue;
            }
        }
        merged.push(candidate);
    }
    merged
}

fn breadcrumb_tail(breadcrumbs: &[String]) -> String {
    let tail: Vec<&str> = breadcrumbs.iter().rev().take(2).rev().map(String::as_str).collect();
    tail.join(" > ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(path: &str, start: u32, end: u32, score: f32, symbol: Option<&str>) -> SearchCandidate {
        SearchCandidate {
            relative_path: path.to_string(),
            start_line: start,
            end_line: end,
            content: format!("content {start}-{end}"),
            score,
            symbol_id: symbol.map(str::to_string),
            symbol_label: symbol.map(str::to_string),
            breadcrumbs: vec!["Module".to_string(), symbol.unwrap_or("").to_string()],
        }
    }

    #[test]
    fn fallback_group_id_is_deterministic() {
        let c = candidate("src/a.rs", 1, 10, 0.9, None);
        assert_eq!(fallback_group_id(&c), fallback_group_id(&c));
        assert_eq!(fallback_group_id(&c).len(), "grp_".len() + 16);
    }

    #[test]
    fn diversity_clamp_limits_per_file() {
        let candidates = vec![
            candidate("src/a.rs", 1, 10, 0.9, Some("s1")),
            candidate("src/a.rs", 20, 30, 0.8, Some("s2")),
            candidate("src/a.rs", 40, 50, 0.7, Some("s3")),
        ];
        let grouped = group_and_clamp(candidates);
        assert_eq!(grouped.len(), DIVERSITY_MAX_PER_FILE);
    }

    #[test]
    fn merge_joins_nearby_same_breadcrumb_chunks() {
        let candidates = vec![
            candidate("src/a.rs", 1, 10, 0.9, Some("s1")),
            candidate("src/a.rs", 15, 20, 0.5, Some("s1")),
        ];
        let merged = merge_adjacent_chunks(candidates, |_, _, _| None);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].end_line, 20);
    }
}
