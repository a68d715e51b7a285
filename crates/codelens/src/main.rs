//! Codelens - semantic code search coordinator for LLM agents.
//!
//! Thin binary crate: parses the CLI, loads configuration, wires the
//! dependency graph from the default (dependency-free) collaborator
//! adapters, and hands the assembled server off to an `rmcp` transport.

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use codelens_application::capability::CapabilityResolver;
use codelens_application::freshness::{FreshnessCoordinator, PeriodicSync};
use codelens_application::search::{ChangedFilesCache, SearchPipeline};
use codelens_application::snapshot::SnapshotStore;
use codelens_application::use_cases::{
    CallGraphUseCase, FileOutlineUseCase, GetIndexingStatusUseCase, ListCodebasesUseCase,
    ManageIndexUseCase, ReadFileUseCase, SearchCodebaseUseCase,
};
use codelens_domain::ports::{EmbedderPort, GitStatusPort, IgnoreMatcherFactory, IndexerPort, OutlineProviderPort, RerankerPort, VectorStorePort};
use codelens_infrastructure::config::{AppConfig, ConfigLoader};
use codelens_infrastructure::ignore_matcher::GlobIgnoreMatcherFactory;
use codelens_infrastructure::logging::init_logging;
use codelens_infrastructure::state_store::FileStateStore;
use codelens_infrastructure::watcher::WatcherSubsystem;
use codelens_providers::embedding::HashEmbedder;
use codelens_providers::git::SubprocessGitStatus;
use codelens_providers::indexer::WalkingIndexer;
use codelens_providers::outline::NoSidecarOutlineProvider;
use codelens_providers::reranker::{LexicalReranker, NullReranker};
use codelens_providers::vector_store::InMemoryVectorStore;
use codelens_server::CodelensServer;

const VECTOR_STORE_PROVIDER: &str = "in_memory";
const EMBEDDING_DIMENSION: usize = 256;

#[derive(Parser, Debug)]
#[command(name = "codelens")]
#[command(about = "Semantic code search coordinator for LLM agents")]
#[command(version)]
struct Cli {
    /// Path to a TOML configuration file. Falls back to the default search
    /// locations when omitted.
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the MCP server over stdio (default when no subcommand is given).
    Serve,
    /// Load and validate the resolved configuration, then print it.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Resolve defaults + file + environment and print the result as TOML.
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut loader = ConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_config_path(path);
    }
    let config = loader.load().context("failed to load configuration")?;

    init_logging(&config.logging).context("failed to initialize logging")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Config { action: ConfigAction::Check } => config_check(&config),
    }
}

fn config_check(config: &AppConfig) -> anyhow::Result<()> {
    let toml = toml::to_string_pretty(config).context("failed to render configuration")?;
    println!("{toml}");
    Ok(())
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let assembled = build_server(&config).await.context("failed to assemble server")?;

    tracing::info!("[STARTUP] starting codelens MCP server on stdio transport");

    use rmcp::ServiceExt;
    let running = assembled
        .server
        .serve(rmcp::transport::stdio())
        .await
        .context("failed to start MCP service")?;
    running.waiting().await.context("MCP service error")?;

    // Keep the watcher subsystem (and its filesystem handles) alive for the
    // full lifetime of the server; dropping it here would tear down every
    // active watch.
    drop(assembled.watcher);

    tracing::info!("[STARTUP] codelens MCP server shut down");
    Ok(())
}

/// The assembled server plus the background collaborators that must outlive
/// the serving loop.
struct Assembled {
    server: CodelensServer,
    watcher: Arc<WatcherSubsystem>,
}

/// Wire the full dependency graph from the default collaborator adapters.
/// No DI framework: every edge here is a plain constructor call, which is
/// also the full list of swap points for a deployment that wants a real
/// vector database, embedding model, or reranking service instead.
async fn build_server(config: &AppConfig) -> anyhow::Result<Assembled> {
    let state_dir = config.resolved_snapshot_dir();
    let persistence = Arc::new(FileStateStore::new(state_dir));
    let snapshot = Arc::new(SnapshotStore::new(persistence));
    snapshot.load().await.context("failed to load persisted snapshot")?;

    let ignore_factory: Arc<dyn IgnoreMatcherFactory> = Arc::new(GlobIgnoreMatcherFactory);
    let embedder: Arc<dyn EmbedderPort> = Arc::new(HashEmbedder::new(EMBEDDING_DIMENSION));
    let vector_store: Arc<dyn VectorStorePort> = Arc::new(InMemoryVectorStore::new());
    let indexer: Arc<dyn IndexerPort> = Arc::new(WalkingIndexer::new(
        Arc::clone(&embedder),
        Arc::clone(&vector_store),
        Arc::clone(&ignore_factory),
        VECTOR_STORE_PROVIDER,
    ));
    let git: Arc<dyn GitStatusPort> = Arc::new(SubprocessGitStatus);
    let outline: Option<Arc<dyn OutlineProviderPort>> = Some(Arc::new(NoSidecarOutlineProvider));

    let reranker: Option<Arc<dyn RerankerPort>> = if config.reranker.auto_rerank {
        Some(Arc::new(LexicalReranker))
    } else {
        Some(Arc::new(NullReranker))
    };
    let capability = Arc::new(CapabilityResolver::new(reranker.clone(), config.reranker.auto_rerank));

    let changed_files = Arc::new(ChangedFilesCache::new(git));
    let changed_files_for_hook = Arc::clone(&changed_files);
    let on_sync_completed = Some(Arc::new(move |path: &std::path::Path| {
        changed_files_for_hook.invalidate(path);
    }) as codelens_application::freshness::SyncCompletedHook);

    let freshness = Arc::new(FreshnessCoordinator::new(
        Arc::clone(&snapshot),
        Arc::clone(&indexer),
        Arc::clone(&ignore_factory),
        on_sync_completed,
    ));

    let pipeline = Arc::new(SearchPipeline::new(Arc::clone(&vector_store), reranker, changed_files, outline.clone()));

    let periodic_sync = PeriodicSync::new();
    periodic_sync.start(Arc::clone(&snapshot), Arc::clone(&freshness)).await;

    let watcher = Arc::new(WatcherSubsystem::new(
        Arc::clone(&freshness),
        Arc::clone(&snapshot),
        Arc::clone(&ignore_factory),
        config.watch.debounce_ms,
    ));
    watcher.start().await;

    let manage_index = Arc::new(ManageIndexUseCase::new(
        Arc::clone(&snapshot),
        Arc::clone(&freshness),
        Arc::clone(&indexer),
        Arc::clone(&vector_store),
        Arc::clone(&ignore_factory),
    ));
    let search_codebase = Arc::new(SearchCodebaseUseCase::new(
        Arc::clone(&snapshot),
        Arc::clone(&freshness),
        Arc::clone(&indexer),
        Arc::clone(&vector_store),
        capability,
        pipeline,
    ));
    let file_outline = Arc::new(FileOutlineUseCase::new(
        Arc::clone(&snapshot),
        Arc::clone(&indexer),
        Arc::clone(&vector_store),
        outline.clone(),
    ));
    let call_graph = Arc::new(CallGraphUseCase::new(
        Arc::clone(&snapshot),
        Arc::clone(&indexer),
        Arc::clone(&vector_store),
        outline,
    ));
    let get_indexing_status = Arc::new(GetIndexingStatusUseCase::new(
        Arc::clone(&snapshot),
        Arc::clone(&indexer),
        Arc::clone(&vector_store),
    ));
    let list_codebases = Arc::new(ListCodebasesUseCase::new(Arc::clone(&snapshot)));
    let read_file = Arc::new(ReadFileUseCase::new());

    // `periodic_sync` keeps running via its own spawned task; this function
    // only needs to hand `watcher` back so its filesystem handles outlive
    // `build_server`'s return.
    let server = CodelensServer::new(
        manage_index,
        search_codebase,
        file_outline,
        call_graph,
        get_indexing_status,
        list_codebases,
        read_file,
    );

    Ok(Assembled { server, watcher })
}
