//! Configuration surface and loader (SPEC_FULL.md §1.3), mirroring the
//! teacher's `ConfigLoader`: defaults, then an optional TOML file, then
//! `CODELENS_`-prefixed environment variables, merged through `figment`.

use codelens_domain::constants::{
    DEFAULT_SEARCH_LIMIT, DEFAULT_WATCH_DEBOUNCE_MS, MAX_SEARCH_LIMIT, MUST_FILTER_TOPK_CEILING,
    PERIODIC_SYNC_INITIAL_DELAY_MS, PERIODIC_SYNC_INTERVAL_MS, SEARCH_CHANGED_FIRST_MAX_CHANGED_FILES,
};
use codelens_domain::error::{Error, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "CODELENS";
const DEFAULT_CONFIG_FILENAME: &str = "codelens.toml";
const DEFAULT_CONFIG_DIR: &str = "codelens";

/// Where the snapshot file and per-codebase state live.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct SnapshotConfig {
    /// Directory holding the persisted snapshot and indexer state. `None`
    /// resolves to the platform config directory at startup.
    pub dir: Option<PathBuf>,
}

/// `search_codebase` resolver defaults and retry ceilings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchConfig {
    /// `limit` when the caller omits it.
    pub default_limit: usize,
    /// `limit` ceiling; requests above this are clamped.
    pub max_limit: usize,
    /// Internal ceiling on `topK` widening during must-filter bounded retry.
    pub must_filter_topk_ceiling: usize,
    /// Above this many changed files, the changed-files-first boost is skipped.
    pub changed_files_max: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_SEARCH_LIMIT,
            max_limit: MAX_SEARCH_LIMIT,
            must_filter_topk_ceiling: MUST_FILTER_TOPK_CEILING,
            changed_files_max: SEARCH_CHANGED_FIRST_MAX_CHANGED_FILES,
        }
    }
}

/// Filesystem watcher debounce settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WatchConfig {
    /// Per-codebase debounce window, in milliseconds.
    pub debounce_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { debounce_ms: DEFAULT_WATCH_DEBOUNCE_MS }
    }
}

/// Periodic full-sync loop cadence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyncConfig {
    /// Interval between periodic sync sweeps, in milliseconds.
    pub interval_ms: u64,
    /// Delay before the first sweep after startup, in milliseconds.
    pub initial_delay_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval_ms: PERIODIC_SYNC_INTERVAL_MS,
            initial_delay_ms: PERIODIC_SYNC_INITIAL_DELAY_MS,
        }
    }
}

/// Reranker capability toggle (spec.md §2 `CapabilityResolver`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RerankerConfig {
    /// Whether `search_codebase` reranks by default when a reranker is wired
    /// and the caller does not pass `useReranker` explicitly.
    pub auto_rerank: bool,
}

impl Default for RerankerConfig {
    fn default() -> Self {
        Self { auto_rerank: true }
    }
}

/// Logging output shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    /// `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
    /// Emit JSON instead of the compact text formatter.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}

/// The coordinator's full resolved configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// Snapshot persistence settings.
    pub snapshot: SnapshotConfig,
    /// Search pipeline defaults and retry ceilings.
    pub search: SearchConfig,
    /// Filesystem watcher settings.
    pub watch: WatchConfig,
    /// Periodic sync loop settings.
    pub sync: SyncConfig,
    /// Reranker capability toggle.
    pub reranker: RerankerConfig,
    /// Logging output settings.
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Resolve `snapshot.dir`, falling back to the platform config directory.
    pub fn resolved_snapshot_dir(&self) -> PathBuf {
        self.snapshot
            .dir
            .clone()
            .or_else(|| dirs::config_dir().map(|d| d.join(DEFAULT_CONFIG_DIR).join("snapshots")))
            .unwrap_or_else(|| PathBuf::from(".codelens/snapshots"))
    }
}

/// Loads and validates [`AppConfig`] from defaults, an optional TOML file,
/// and environment variables, in that overriding order.
#[derive(Clone)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
    env_prefix: String,
}

impl ConfigLoader {
    /// A loader with no explicit file path; `load` will probe the default
    /// search locations.
    pub fn new() -> Self {
        Self { config_path: None, env_prefix: ENV_PREFIX.to_string() }
    }

    /// Use this TOML file instead of probing default locations.
    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Override the environment variable prefix (default `CODELENS`).
    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Load and validate the effective configuration.
    pub fn load(&self) -> Result<AppConfig> {
        let mut figment = Figment::new().merge(Serialized::defaults(AppConfig::default()));

        match &self.config_path {
            Some(path) if path.exists() => {
                figment = figment.merge(Toml::file(path));
                tracing::info!(path = %path.display(), "[CONFIG] loaded configuration file");
            }
            Some(path) => {
                tracing::warn!(path = %path.display(), "[CONFIG] configuration file not found");
            }
            None => {
                if let Some(default_path) = Self::find_default_config_path() {
                    figment = figment.merge(Toml::file(&default_path));
                    tracing::info!(path = %default_path.display(), "[CONFIG] loaded configuration file");
                }
            }
        }

        figment = figment.merge(Env::prefixed(&format!("{}_", self.env_prefix)).split("_"));

        let config: AppConfig = figment
            .extract()
            .map_err(|e| Error::config(format!("failed to extract configuration: {e}")))?;

        validate(&config)?;
        Ok(config)
    }

    fn find_default_config_path() -> Option<PathBuf> {
        let current_dir = env::current_dir().ok()?;
        let candidates = [
            current_dir.join(DEFAULT_CONFIG_FILENAME),
            current_dir.join(".codelens").join(DEFAULT_CONFIG_FILENAME),
            dirs::config_dir().map(|d| d.join(DEFAULT_CONFIG_DIR).join(DEFAULT_CONFIG_FILENAME))?,
        ];
        candidates.into_iter().find(|path| path.exists())
    }

    /// Serialize `config` as TOML and write it to `path`.
    pub fn save_to_file<P: AsRef<Path>>(&self, config: &AppConfig, path: P) -> Result<()> {
        let toml_string = toml::to_string_pretty(config)
            .map_err(|e| Error::config(format!("failed to serialize config: {e}")))?;
        std::fs::write(path.as_ref(), toml_string)?;
        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn validate(config: &AppConfig) -> Result<()> {
    if config.search.default_limit == 0 {
        return Err(Error::config("search.default_limit cannot be 0"));
    }
    if config.search.default_limit > config.search.max_limit {
        return Err(Error::config("search.default_limit cannot exceed search.max_limit"));
    }
    if config.watch.debounce_ms == 0 {
        return Err(Error::config("watch.debounce_ms cannot be 0"));
    }
    if config.sync.interval_ms == 0 {
        return Err(Error::config("sync.interval_ms cannot be 0"));
    }
    if !matches!(config.logging.level.to_lowercase().as_str(), "trace" | "debug" | "info" | "warn" | "warning" | "error") {
        return Err(Error::config(format!("invalid logging.level '{}'", config.logging.level)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_validation() {
        assert!(validate(&AppConfig::default()).is_ok());
    }

    #[test]
    fn zero_default_limit_is_rejected() {
        let mut config = AppConfig::default();
        config.search.default_limit = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn default_limit_above_max_is_rejected() {
        let mut config = AppConfig::default();
        config.search.default_limit = config.search.max_limit + 1;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn loader_with_missing_file_falls_back_to_defaults() {
        let loader = ConfigLoader::new().with_config_path("/nonexistent/codelens.toml");
        let config = loader.load().expect("defaults should validate");
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn loader_reads_toml_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("codelens.toml");
        std::fs::write(&path, "[search]\ndefault_limit = 25\nmax_limit = 100\nmust_filter_topk_ceiling = 140\nchanged_files_max = 256\n").unwrap();

        let config = ConfigLoader::new().with_config_path(&path).load().unwrap();
        assert_eq!(config.search.default_limit, 25);
    }
}
