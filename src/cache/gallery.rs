use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

use crate::cache::{CacheService, CachedItems};
use crate::models::gallery::GalleryItem;

impl CacheService {
    /// Получить список источника, если он ещё свежий.
    pub async fn get_gallery_items(&self, source: &str) -> Option<Arc<Vec<GalleryItem>>> {
        if !self.is_enabled() {
            return None;
        }
        let entries = self.entries.read().await;
        entries
            .get(source)
            .filter(|cached| cached.stored_at.elapsed() < self.ttl)
            .map(|cached| cached.items.clone())
    }

    /// Сохранить список источника. При выключенном кеше просто оборачивает в `Arc`.
    pub async fn put_gallery_items(&self, source: &str, items: Vec<GalleryItem>) -> Arc<Vec<GalleryItem>> {
        let items = Arc::new(items);
        if self.is_enabled() {
            let mut entries = self.entries.write().await;
            entries.insert(
                source.to_string(),
                CachedItems { stored_at: Instant::now(), items: items.clone() },
            );
            debug!("Cached {} gallery items for {}", items.len(), source);
        }
        items
    }
}
