use std::time::Duration;

use chrono::Utc;
use tracing::debug;

use crate::app::AppState;

/// Periodic cleanup of expired messages and stale empty leaves.
///
/// Shares the state lock with the HTTP handlers; contention is acceptable
/// because individual tree operations take microseconds. Runs until the
/// owning future is dropped at shutdown — the tree is volatile, so no
/// flush is needed.
pub async fn run_cleanup_loop(state: AppState, every: Duration) {
    let mut ticker = tokio::time::interval(every);
    // The first tick resolves immediately; skip it so startup does not
    // run a redundant pass.
    ticker.tick().await;
    loop {
        ticker.tick().await;
        let now = Utc::now();
        let mut guard = state.inner.lock().await;
        guard.tree.cleanup_expired(now);
        drop(guard);
        debug!("cleanup pass complete");
    }
}
