//! Periodic background sync (spec.md §4.2 "Periodic sync"), shaped after the
//! teacher's `ContextDaemon` self-rescheduling loop: an `AtomicBool` running
//! flag plus a loop that sleeps between cycles rather than a fixed
//! `tokio::time::interval`, so a slow cycle can never overlap the next one.

use codelens_domain::constants::{PERIODIC_SYNC_INITIAL_DELAY_MS, PERIODIC_SYNC_INTERVAL_MS};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;

use super::coordinator::FreshnessCoordinator;
use super::types::EnsureFreshnessOptions;
use crate::snapshot::SnapshotStore;

/// Owns the background task that walks every `indexed`/`sync_completed`
/// codebase on a fixed cadence and calls `ensureFreshness(path, 0)` on each.
pub struct PeriodicSync {
    running: Arc<AtomicBool>,
    handle: tokio::sync::Mutex<Option<JoinHandle<()>>>,
}

impl PeriodicSync {
    /// Construct a stopped periodic-sync loop.
    pub fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(false)),
            handle: tokio::sync::Mutex::new(None),
        }
    }

    /// Spawn the loop if not already running.
    pub async fn start(&self, snapshot: Arc<SnapshotStore>, freshness: Arc<FreshnessCoordinator>) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }

        let running = Arc::clone(&self.running);
        let join = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(PERIODIC_SYNC_INITIAL_DELAY_MS)).await;

            while running.load(Ordering::Relaxed) {
                let codebases = snapshot.get_indexed().await;
                for info in codebases {
                    if !running.load(Ordering::Relaxed) {
                        break;
                    }
                    let decision = freshness
                        .ensure_freshness(&info.path, 0, EnsureFreshnessOptions::default())
                        .await;
                    tracing::debug!(
                        target: "sync",
                        path = %info.path.display(),
                        mode = ?decision.mode,
                        "[SYNC] periodic sync tick"
                    );
                }
                tokio::time::sleep(Duration::from_millis(PERIODIC_SYNC_INTERVAL_MS)).await;
            }
        });

        *self.handle.lock().await = Some(join);
    }

    /// Stop the loop; waits for the current cycle to notice and exit.
    pub async fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.lock().await.take() {
            handle.abort();
        }
    }
}

impl Default for PeriodicSync {
    fn default() -> Self {
        Self::new()
    }
}
