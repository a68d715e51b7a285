//! Basic walk-and-chunk `IndexerPort` adapter: fixed-line-window splitting, no
//! AST awareness, no internal filesystem synchronizer — every
//! `reindex_by_change` rewalks the tree and diffs against the last known
//! content hashes. Grounded on the teacher's `InMemoryVectorStoreProvider`
//! default-adapter idiom (`src/adapters/providers/vector_store/in_memory.rs`):
//! a dependency-free collaborator the workspace can run and test without a
//! real AST splitter wired in.

use async_trait::async_trait;
use codelens_domain::error::Result;
use codelens_domain::ports::{
    EmbedderPort, IgnoreMatcherFactory, IndexOutcome, ProgressCallback, ReindexOutcome, VectorStorePort,
};
use codelens_domain::value_objects::{
    IndexCompleteness, IndexFingerprint, SearchCandidate, collection_name_for,
};
use dashmap::DashMap;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/// Lines per chunk. No AST splitting — a fixed window keeps this adapter
/// simple; a real indexer is expected to supply its own splitter.
const CHUNK_WINDOW_LINES: usize = 40;

struct TrackedFile {
    content_hash: u64,
}

/// Per-codebase tracked state: the basis `reindex_by_change` diffs against.
#[derive(Default)]
struct Tracked {
    files: HashMap<String, TrackedFile>,
}

/// A fixed-window chunking indexer over the local filesystem.
pub struct WalkingIndexer {
    embedder: Arc<dyn EmbedderPort>,
    vector_store: Arc<dyn VectorStorePort>,
    ignore_factory: Arc<dyn IgnoreMatcherFactory>,
    vector_store_provider: String,
    tracked: DashMap<PathBuf, Tracked>,
    active_ignore_patterns: DashMap<PathBuf, Vec<String>>,
}

impl WalkingIndexer {
    /// Build an indexer over the given collaborators; `vector_store_provider`
    /// is recorded verbatim in the runtime fingerprint.
    pub fn new(
        embedder: Arc<dyn EmbedderPort>,
        vector_store: Arc<dyn VectorStorePort>,
        ignore_factory: Arc<dyn IgnoreMatcherFactory>,
        vector_store_provider: impl Into<String>,
    ) -> Self {
        Self {
            embedder,
            vector_store,
            ignore_factory,
            vector_store_provider: vector_store_provider.into(),
            tracked: DashMap::new(),
            active_ignore_patterns: DashMap::new(),
        }
    }

    fn collection(&self, path: &Path) -> String {
        collection_name_for(path)
    }

    async fn walk_files(&self, path: &Path) -> Vec<(String, String)> {
        let extra = self.active_ignore_patterns.get(path).map(|p| p.clone()).unwrap_or_default();
        let matcher = self.ignore_factory.build(path, &extra);

        let mut out = Vec::new();
        for entry in WalkDir::new(path).into_iter().filter_map(std::result::Result::ok) {
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(path) else {
                continue;
            };
            let relative_str = relative.to_string_lossy().replace('\\', "/");
            if matcher.is_ignored(&relative_str) {
                continue;
            }
            if let Ok(content) = tokio::fs::read_to_string(entry.path()).await {
                out.push((relative_str, content));
            }
        }
        out
    }

    fn chunk(relative_path: &str, content: &str) -> Vec<SearchCandidate> {
        let lines: Vec<&str> = content.lines().collect();
        if lines.is_empty() {
            return Vec::new();
        }
        lines
            .chunks(CHUNK_WINDOW_LINES)
            .enumerate()
            .map(|(i, window)| SearchCandidate {
                relative_path: relative_path.to_string(),
                start_line: (i * CHUNK_WINDOW_LINES + 1) as u32,
                end_line: (i * CHUNK_WINDOW_LINES + window.len()) as u32,
                content: window.join("\n"),
                score: 0.0,
                symbol_id: None,
                symbol_label: None,
                breadcrumbs: Vec::new(),
            })
            .collect()
    }

    fn hash_content(content: &str) -> u64 {
        let mut hasher = DefaultHasher::new();
        content.hash(&mut hasher);
        hasher.finish()
    }
}

#[async_trait]
impl codelens_domain::ports::IndexerPort for WalkingIndexer {
    async fn index_codebase(&self, path: &Path, progress: ProgressCallback) -> Result<IndexOutcome> {
        let collection = self.collection(path);
        self.vector_store.create_hybrid_collection(&collection, self.embedder.dimension()).await?;

        let files = self.walk_files(path).await;
        let total = files.len().max(1);

        let mut tracked = Tracked::default();
        let mut total_chunks = 0u64;

        for (i, (relative_path, content)) in files.iter().enumerate() {
            let chunks = Self::chunk(relative_path, content);
            total_chunks += chunks.len() as u64;
            if !chunks.is_empty() {
                self.vector_store.insert_hybrid(&collection, chunks).await?;
            }
            tracked.files.insert(relative_path.clone(), TrackedFile { content_hash: Self::hash_content(content) });
            progress((((i + 1) * 100) / total) as u8);
        }

        self.tracked.insert(path.to_path_buf(), tracked);
        tracing::info!(path = %path.display(), files = files.len(), chunks = total_chunks, "[INDEX] full index complete");

        Ok(IndexOutcome {
            indexed_files: files.len() as u64,
            total_chunks,
            status: IndexCompleteness::Completed,
        })
    }

    async fn reindex_by_change(&self, path: &Path) -> Result<ReindexOutcome> {
        let collection = self.collection(path);
        let current = self.walk_files(path).await;
        let current_hashes: HashMap<String, u64> =
            current.iter().map(|(p, c)| (p.clone(), Self::hash_content(c))).collect();

        let previous_paths: Vec<String> =
            self.tracked.get(path).map(|t| t.files.keys().cloned().collect()).unwrap_or_default();

        let mut added = 0u64;
        let mut modified = 0u64;
        let mut changed_files = Vec::new();

        for (relative_path, content) in &current {
            let is_new = !previous_paths.contains(relative_path);
            let was_modified = !is_new
                && self
                    .tracked
                    .get(path)
                    .and_then(|t| t.files.get(relative_path).map(|f| f.content_hash))
                    != current_hashes.get(relative_path).copied();

            if is_new || was_modified {
                self.vector_store.delete(&collection, std::slice::from_ref(relative_path)).await?;
                let chunks = Self::chunk(relative_path, content);
                if !chunks.is_empty() {
                    self.vector_store.insert_hybrid(&collection, chunks).await?;
                }
                changed_files.push(relative_path.clone());
                if is_new {
                    added += 1;
                } else {
                    modified += 1;
                }
            }
        }

        let current_paths: std::collections::HashSet<&String> = current.iter().map(|(p, _)| p).collect();
        let removed_paths: Vec<String> =
            previous_paths.iter().filter(|p| !current_paths.contains(p)).cloned().collect();
        if !removed_paths.is_empty() {
            self.vector_store.delete(&collection, &removed_paths).await?;
            changed_files.extend(removed_paths.iter().cloned());
        }
        let removed = removed_paths.len() as u64;

        let new_tracked = Tracked {
            files: current_hashes.into_iter().map(|(p, h)| (p, TrackedFile { content_hash: h })).collect(),
        };
        self.tracked.insert(path.to_path_buf(), new_tracked);

        Ok(ReindexOutcome { added, removed, modified, changed_files })
    }

    async fn has_indexed_collection(&self, path: &Path) -> Result<bool> {
        self.vector_store.has_collection(&self.collection(path)).await
    }

    async fn active_ignore_patterns(&self, path: &Path) -> Result<Vec<String>> {
        Ok(self.active_ignore_patterns.get(path).map(|p| p.clone()).unwrap_or_default())
    }

    async fn reload_ignore_rules(&self, path: &Path) -> Result<()> {
        let mut patterns = Vec::new();
        for filename in codelens_domain::constants::IGNORE_CONTROL_FILES {
            if let Ok(content) = tokio::fs::read_to_string(path.join(filename)).await {
                patterns.extend(
                    content
                        .lines()
                        .map(str::trim)
                        .filter(|l| !l.is_empty() && !l.starts_with('#'))
                        .map(str::to_string),
                );
            }
        }
        self.active_ignore_patterns.insert(path.to_path_buf(), patterns);
        Ok(())
    }

    fn has_synchronizer(&self, _path: &Path) -> bool {
        false
    }

    async fn recreate_synchronizer(&self, _path: &Path) -> Result<()> {
        Ok(())
    }

    async fn delete_indexed_paths(&self, path: &Path, relative_paths: &[String]) -> Result<()> {
        self.vector_store.delete(&self.collection(path), relative_paths).await?;
        if let Some(mut tracked) = self.tracked.get_mut(path) {
            for p in relative_paths {
                tracked.files.remove(p);
            }
        }
        Ok(())
    }

    async fn tracked_relative_paths(&self, path: &Path) -> Result<Vec<String>> {
        Ok(self.tracked.get(path).map(|t| t.files.keys().cloned().collect()).unwrap_or_default())
    }

    fn runtime_fingerprint(&self) -> IndexFingerprint {
        IndexFingerprint {
            embedding_provider: self.embedder.provider_name().to_string(),
            embedding_model: self.embedder.model_name().to_string(),
            embedding_dimension: self.embedder.dimension() as i64,
            vector_store_provider: self.vector_store_provider.clone(),
            schema_version: "1".to_string(),
        }
    }

    fn splitter_name(&self) -> &str {
        "fixed-line-window"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashEmbedder;
    use crate::vector_store::InMemoryVectorStore;
    use codelens_domain::ports::{IgnoreMatcherPort, IndexerPort};

    struct NullIgnoreMatcher;
    impl IgnoreMatcherPort for NullIgnoreMatcher {
        fn is_ignored(&self, _relative_path: &str) -> bool {
            false
        }
    }
    #[derive(Default)]
    struct NullIgnoreFactory;
    impl IgnoreMatcherFactory for NullIgnoreFactory {
        fn build(&self, _root: &Path, _extra: &[String]) -> Box<dyn IgnoreMatcherPort> {
            Box::new(NullIgnoreMatcher)
        }
    }

    fn make_indexer() -> WalkingIndexer {
        WalkingIndexer::new(
            Arc::new(HashEmbedder::default()),
            Arc::new(InMemoryVectorStore::new()),
            Arc::new(NullIgnoreFactory),
            "in_memory",
        )
    }

    #[tokio::test]
    async fn indexes_files_and_reports_progress() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.rs"), "fn main() {}\n".repeat(5)).unwrap();
        std::fs::write(dir.path().join("b.rs"), "fn other() {}\n").unwrap();

        let indexer = make_indexer();
        let outcome = indexer.index_codebase(dir.path(), Box::new(|_| {})).await.unwrap();

        assert_eq!(outcome.indexed_files, 2);
        assert!(outcome.total_chunks >= 2);
        assert_eq!(outcome.status, IndexCompleteness::Completed);
    }

    #[tokio::test]
    async fn reindex_detects_added_modified_and_removed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.rs"), "fn a() {}\n").unwrap();
        let indexer = make_indexer();
        indexer.index_codebase(dir.path(), Box::new(|_| {})).await.unwrap();

        std::fs::write(dir.path().join("a.rs"), "fn a_changed() {}\n").unwrap();
        std::fs::write(dir.path().join("b.rs"), "fn b() {}\n").unwrap();

        let delta = indexer.reindex_by_change(dir.path()).await.unwrap();
        assert_eq!(delta.added, 1);
        assert_eq!(delta.modified, 1);
        assert_eq!(delta.removed, 0);

        std::fs::remove_file(dir.path().join("b.rs")).unwrap();
        let delta2 = indexer.reindex_by_change(dir.path()).await.unwrap();
        assert_eq!(delta2.removed, 1);
    }
}
