use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::AppState;

pub struct CleanupService {
    state: Arc<AppState>,
}

impl CleanupService {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Запускает полную очистку: сессии + кеш витрины
    pub async fn run_full_cleanup(&self) -> CleanupStats {
        let stats = CleanupStats {
            expired_sessions: self.cleanup_idle_sessions().await,
            expired_cache_entries: self.state.cache.purge_expired().await,
            open_sessions: self.state.sessions.len().await,
        };
        if stats.total_items_cleaned() > 0 {
            info!(
                "🧹 Cleanup done: {} sessions evicted, {} cache entries purged, {} sessions open",
                stats.expired_sessions, stats.expired_cache_entries, stats.open_sessions
            );
        } else {
            debug!("🧹 Nothing to clean up, {} sessions open", stats.open_sessions);
        }
        stats
    }

    /// Сессии, к которым давно не обращались
    async fn cleanup_idle_sessions(&self) -> usize {
        let ttl = Duration::from_secs(self.state.config.sessions.ttl_seconds);
        self.state.sessions.evict_idle(ttl).await
    }

    /// Фоновый цикл очистки, период из SESSION_SWEEP_SECONDS.
    pub async fn run_forever(self) {
        let period = Duration::from_secs(self.state.config.sessions.sweep_seconds.max(1));
        loop {
            tokio::time::sleep(period).await;
            self.run_full_cleanup().await;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanupStats {
    pub expired_sessions: usize,
    pub expired_cache_entries: usize,
    pub open_sessions: usize,
}

impl CleanupStats {
    pub fn total_items_cleaned(&self) -> usize {
        self.expired_sessions + self.expired_cache_entries
    }
}
