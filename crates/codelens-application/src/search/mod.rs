mod changed_files;
mod grouping;
mod noise;
mod operators;
mod pipeline;
mod scope;

pub use changed_files::{CHANGED_FILE_SCORE_BOOST, ChangedFilesCache};
pub use grouping::{GroupedResult, NavigationFallback, fallback_group_id, group_and_clamp, merge_adjacent_chunks};
pub use noise::{NoiseMitigationHint, NoiseRatios, SUGGESTED_IGNORE_PATTERNS, evaluate_noise};
pub use operators::parse_query;
pub use pipeline::{RerankSummary, SearchOutcome, SearchPipeline, SearchRequest, SearchResult};
pub use scope::{is_docs_path, is_fixture_path, is_generated_path, is_non_runtime_path, is_test_path, keep_under_scope};
