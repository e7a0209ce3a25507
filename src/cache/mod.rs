use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::info;

pub mod gallery;

use crate::models::gallery::GalleryItem;

struct CachedItems {
    stored_at: Instant,
    items: Arc<Vec<GalleryItem>>,
}

/// Кеш списков портфолио в памяти процесса.
#[derive(Clone)]
pub struct CacheService {
    ttl: Duration,
    entries: Arc<RwLock<HashMap<String, CachedItems>>>,
}

impl CacheService {
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            ttl: Duration::from_secs(ttl_seconds),
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    // Удалить записи с истёкшим TTL
    pub async fn purge_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        let ttl = self.ttl;
        entries.retain(|_, cached| cached.stored_at.elapsed() < ttl);
        let removed = before - entries.len();
        if removed > 0 {
            info!("Purged {} expired catalog cache entries", removed);
        }
        removed
    }
}
