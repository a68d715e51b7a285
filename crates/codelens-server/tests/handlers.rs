//! End-to-end handler tests against the default (in-memory) collaborator
//! adapters, grounded on the teacher's `tests/handlers/index_codebase_test.rs`
//! pattern of exercising a handler directly through `Parameters(args)`.

use std::sync::Arc;

use codelens_application::capability::CapabilityResolver;
use codelens_application::freshness::FreshnessCoordinator;
use codelens_application::search::{ChangedFilesCache, SearchPipeline};
use codelens_application::snapshot::SnapshotStore;
use codelens_application::use_cases::{ListCodebasesUseCase, ManageIndexUseCase, ReadFileUseCase, SearchCodebaseUseCase};
use codelens_domain::ports::{EmbedderPort, GitStatusPort, IgnoreMatcherFactory, IndexerPort, VectorStorePort};
use codelens_providers::embedding::HashEmbedder;
use codelens_providers::git::SubprocessGitStatus;
use codelens_providers::indexer::WalkingIndexer;
use codelens_providers::vector_store::InMemoryVectorStore;
use codelens_server::args::{ListCodebasesArgs, ManageIndexArgs, ReadFileArgs, SearchCodebaseArgs};
use codelens_server::handlers::{ListCodebasesHandler, ManageIndexHandler, ReadFileHandler, SearchCodebaseHandler};
use rmcp::handler::server::wrapper::Parameters;

struct TestIgnoreFactory;

impl IgnoreMatcherFactory for TestIgnoreFactory {
    fn build(&self, _root: &std::path::Path, _extra_patterns: &[String]) -> Box<dyn codelens_domain::ports::IgnoreMatcherPort> {
        struct NeverIgnore;
        impl codelens_domain::ports::IgnoreMatcherPort for NeverIgnore {
            fn is_ignored(&self, _relative_path: &str) -> bool {
                false
            }
        }
        Box::new(NeverIgnore)
    }
}

fn response_text(result: &rmcp::model::CallToolResult) -> serde_json::Value {
    let content = result.content.first().expect("response should have one content block");
    let rmcp::model::RawContent::Text(text_content) = &content.raw else {
        panic!("expected text content block");
    };
    serde_json::from_str(&text_content.text).expect("content should be JSON")
}

fn build_harness() -> (Arc<ManageIndexHandler>, Arc<SearchCodebaseHandler>) {
    let persistence = Arc::new(codelens_infrastructure::state_store::FileStateStore::new(
        std::env::temp_dir().join(format!("codelens-test-{}", uuid::Uuid::new_v4())),
    ));
    let snapshot = Arc::new(SnapshotStore::new(persistence));
    let ignore_factory: Arc<dyn IgnoreMatcherFactory> = Arc::new(TestIgnoreFactory);
    let embedder: Arc<dyn EmbedderPort> = Arc::new(HashEmbedder::new(32));
    let vector_store: Arc<dyn VectorStorePort> = Arc::new(InMemoryVectorStore::new());
    let indexer: Arc<dyn IndexerPort> = Arc::new(WalkingIndexer::new(
        Arc::clone(&embedder),
        Arc::clone(&vector_store),
        Arc::clone(&ignore_factory),
        "in_memory",
    ));
    let git: Arc<dyn GitStatusPort> = Arc::new(SubprocessGitStatus);
    let freshness = Arc::new(FreshnessCoordinator::new(
        Arc::clone(&snapshot),
        Arc::clone(&indexer),
        Arc::clone(&ignore_factory),
        None,
    ));
    let capability = Arc::new(CapabilityResolver::new(None, false));
    let changed_files = Arc::new(ChangedFilesCache::new(git));
    let reranker: Option<Arc<dyn codelens_domain::ports::RerankerPort>> = None;
    let outline: Option<Arc<dyn codelens_domain::ports::OutlineProviderPort>> = None;
    let pipeline = Arc::new(SearchPipeline::new(Arc::clone(&vector_store), reranker, changed_files, outline));

    let manage_index = Arc::new(ManageIndexHandler::new(Arc::new(ManageIndexUseCase::new(
        Arc::clone(&snapshot),
        Arc::clone(&freshness),
        Arc::clone(&indexer),
        Arc::clone(&vector_store),
        Arc::clone(&ignore_factory),
    ))));
    let search_codebase = Arc::new(SearchCodebaseHandler::new(Arc::new(SearchCodebaseUseCase::new(
        snapshot,
        freshness,
        indexer,
        vector_store,
        capability,
        pipeline,
    ))));

    (manage_index, search_codebase)
}

fn build_snapshot() -> Arc<SnapshotStore> {
    let persistence = Arc::new(codelens_infrastructure::state_store::FileStateStore::new(
        std::env::temp_dir().join(format!("codelens-test-{}", uuid::Uuid::new_v4())),
    ));
    Arc::new(SnapshotStore::new(persistence))
}

#[tokio::test]
async fn list_codebases_on_empty_snapshot_reports_all_groups_empty() {
    let snapshot = build_snapshot();
    let handler = ListCodebasesHandler::new(Arc::new(ListCodebasesUseCase::new(snapshot)));

    let result = handler.handle(Parameters(ListCodebasesArgs {})).await.expect("handler should not error");
    let body = response_text(&result);
    assert_eq!(body["status"], "ok");
    assert!(body["codebases"]["indexed"].as_array().unwrap().is_empty());
    assert!(body["codebases"]["not_found"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn read_file_returns_contents_for_an_existing_absolute_path() {
    let handler = ReadFileHandler::new(Arc::new(ReadFileUseCase::new()));
    let file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(file.path(), "hello from disk").unwrap();

    let args = ReadFileArgs { path: file.path().to_string_lossy().to_string() };
    let result = handler.handle(Parameters(args)).await.expect("handler should not error");
    let body = response_text(&result);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["contents"], "hello from disk");
}

#[tokio::test]
async fn read_file_rejects_relative_paths() {
    let handler = ReadFileHandler::new(Arc::new(ReadFileUseCase::new()));

    let args = ReadFileArgs { path: "relative/path.rs".to_string() };
    let result = handler.handle(Parameters(args)).await.expect("handler should not error, envelope carries the error");
    let body = response_text(&result);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn search_on_unindexed_codebase_reports_not_indexed() {
    let (_manage_index, search_codebase) = build_harness();

    let args = SearchCodebaseArgs {
        path: "/tmp/codelens-nonexistent-codebase".to_string(),
        query: "parse config".to_string(),
        limit: 10,
        scope: None,
        result_mode: None,
        extension_filter: None,
        exclude_patterns: None,
        use_reranker: None,
        ranking_mode: None,
    };

    let result = search_codebase.handle(Parameters(args)).await.expect("handler should not error");
    let body = response_text(&result);
    assert_eq!(body["status"], "not_indexed");
}

#[tokio::test]
async fn manage_index_create_then_status_reports_progress() {
    let (manage_index, _search_codebase) = build_harness();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().to_string_lossy().to_string();

    let create_args = ManageIndexArgs {
        action: "create".to_string(),
        path: path.clone(),
        force: None,
        splitter: None,
        custom_extensions: None,
        ignore_patterns: None,
    };
    let create_result = manage_index.handle(Parameters(create_args)).await.expect("create should not error");
    let create_body = response_text(&create_result);
    assert_eq!(create_body["status"], "indexing");

    let status_args = ManageIndexArgs {
        action: "status".to_string(),
        path,
        force: None,
        splitter: None,
        custom_extensions: None,
        ignore_patterns: None,
    };
    let status_result = manage_index.handle(Parameters(status_args)).await.expect("status should not error");
    let status_body = response_text(&status_result);
    // The background index task may finish before this status check runs on
    // an empty directory, so either in-flight or already-complete is valid.
    let kind = status_body["kind"].as_str().unwrap();
    assert!(matches!(kind, "indexing" | "indexed"), "unexpected status kind: {kind}");
}

#[tokio::test]
async fn manage_index_rejects_blank_path() {
    let (manage_index, _search_codebase) = build_harness();

    let args = ManageIndexArgs {
        action: "create".to_string(),
        path: "   ".to_string(),
        force: None,
        splitter: None,
        custom_extensions: None,
        ignore_patterns: None,
    };

    let result = manage_index.handle(Parameters(args)).await;
    assert!(result.is_err());
}
