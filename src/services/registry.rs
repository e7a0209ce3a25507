use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::services::session::BookingSession;

pub type SharedSession = Arc<Mutex<BookingSession>>;

/// Открытые сессии бронирования. У каждой свой мьютекс.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<Uuid, SharedSession>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, session: BookingSession) -> (Uuid, SharedSession) {
        let id = Uuid::new_v4();
        let shared = Arc::new(Mutex::new(session));
        self.sessions.write().await.insert(id, shared.clone());
        (id, shared)
    }

    pub async fn get(&self, id: &Uuid) -> Option<SharedSession> {
        self.sessions.read().await.get(id).cloned()
    }

    pub async fn remove(&self, id: &Uuid) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Удаляет сессии, простаивающие дольше `ttl`.
    /// Сессии с запросом в полёте или под блокировкой не трогаем.
    pub async fn evict_idle(&self, ttl: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| match session.try_lock() {
            Ok(guard) => guard.phase().in_flight() || guard.idle_for() < ttl,
            Err(_) => true,
        });
        before - sessions.len()
    }
}
