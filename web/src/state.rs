use anyhow::Result;
use kingchat_core::{ChatSession, Config, Persona};
use kingchat_ollama::{Backend, OllamaClient};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::session::SessionId;

/// Sessions kept before the least recently used one is dropped
pub const MAX_SESSIONS: usize = 1024;

struct SessionEntry {
    session: ChatSession,
    last_used: u64,
}

pub struct AppState {
    pub config: Config,
    pub persona: Arc<Persona>,
    pub backend: Arc<dyn Backend>,
    sessions: RwLock<HashMap<String, SessionEntry>>,
    max_sessions: usize,
    clock: AtomicU64,
}

impl AppState {
    pub fn new(config: Config, backend: Arc<dyn Backend>) -> Self {
        Self::with_capacity(config, backend, MAX_SESSIONS)
    }

    /// Like `new`, keeping at most `max_sessions` sessions (at least one)
    pub fn with_capacity(config: Config, backend: Arc<dyn Backend>, max_sessions: usize) -> Self {
        let persona = Arc::new(config.persona.clone());
        Self {
            config,
            persona,
            backend,
            sessions: RwLock::new(HashMap::new()),
            max_sessions: max_sessions.max(1),
            clock: AtomicU64::new(0),
        }
    }

    /// State backed by the Ollama server named in the config
    pub fn with_ollama(config: Config) -> Result<Self> {
        let client = OllamaClient::new(config.ollama.base_url.clone(), config.ollama.timeout())?;
        Ok(Self::new(config, Arc::new(client)))
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed)
    }

    /// Mark the session under `id` as used, creating it if needed. Creating
    /// evicts the least recently used session when the store is full.
    fn touch_session<'a>(
        &self,
        sessions: &'a mut HashMap<String, SessionEntry>,
        id: &str,
    ) -> &'a mut SessionEntry {
        if !sessions.contains_key(id) && sessions.len() >= self.max_sessions {
            evict_oldest(sessions);
        }
        let entry = sessions.entry(id.to_string()).or_insert_with(|| SessionEntry {
            session: ChatSession::from_config(&self.config, self.persona.clone()),
            last_used: 0,
        });
        entry.last_used = self.tick();
        entry
    }

    /// Reuse the session named by the cookie, or start a new one
    pub async fn resolve_session(&self, existing: Option<&str>) -> SessionId {
        if let Some(id) = existing {
            if self.sessions.read().await.contains_key(id) {
                return SessionId::existing(id);
            }
        }

        let id = uuid::Uuid::new_v4().to_string();
        let mut sessions = self.sessions.write().await;
        self.touch_session(&mut sessions, &id);
        tracing::debug!("Started session {} ({} active)", id, sessions.len());
        SessionId::new(id)
    }

    /// Run `f` against a session, recreating it if it was evicted meanwhile
    pub async fn with_session<T>(&self, id: &str, f: impl FnOnce(&mut ChatSession) -> T) -> T {
        let mut sessions = self.sessions.write().await;
        let entry = self.touch_session(&mut sessions, id);
        f(&mut entry.session)
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn has_session(&self, id: &str) -> bool {
        self.sessions.read().await.contains_key(id)
    }
}

fn evict_oldest(sessions: &mut HashMap<String, SessionEntry>) {
    let oldest = sessions
        .iter()
        .min_by_key(|(_, entry)| entry.last_used)
        .map(|(id, _)| id.clone());
    if let Some(id) = oldest {
        tracing::debug!("Evicting idle session {}", id);
        sessions.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use kingchat_ollama::{FragmentReceiver, GenerateRequest, ModelTag};
    use tokio::sync::mpsc;

    struct Silent;

    #[async_trait]
    impl Backend for Silent {
        async fn generate_stream(&self, _request: GenerateRequest) -> kingchat_ollama::Result<FragmentReceiver> {
            let (_tx, rx) = mpsc::channel(1);
            Ok(rx)
        }

        async fn list_models(&self) -> kingchat_ollama::Result<Vec<ModelTag>> {
            Ok(Vec::new())
        }
    }

    fn state(max_sessions: usize) -> AppState {
        AppState::with_capacity(Config::default(), Arc::new(Silent), max_sessions)
    }

    #[tokio::test]
    async fn least_recently_used_session_is_evicted() {
        let state = state(2);
        let first = state.resolve_session(None).await;
        let second = state.resolve_session(None).await;

        // Touch the older session so the other one becomes the eviction candidate
        state.with_session(&first.id, |s| s.clear()).await;
        let third = state.resolve_session(None).await;

        assert_eq!(state.session_count().await, 2);
        assert!(state.has_session(&first.id).await);
        assert!(!state.has_session(&second.id).await);
        assert!(state.has_session(&third.id).await);
    }

    #[tokio::test]
    async fn recreated_sessions_respect_the_cap() {
        let state = state(2);
        state.resolve_session(None).await;
        state.resolve_session(None).await;

        state.with_session("evicted-elsewhere", |_| ()).await;
        state.with_session("another-stale-id", |_| ()).await;

        assert_eq!(state.session_count().await, 2);
        assert!(state.has_session("another-stale-id").await);
    }

    #[tokio::test]
    async fn known_cookie_reuses_the_session() {
        let state = state(2);
        let created = state.resolve_session(None).await;
        assert!(created.is_new);

        let again = state.resolve_session(Some(&created.id)).await;
        assert!(!again.is_new);
        assert_eq!(again.id, created.id);
        assert_eq!(state.session_count().await, 1);
    }

    #[test]
    fn default_capacity_is_bounded() {
        assert_eq!(state(0).max_sessions, 1);
        assert_eq!(AppState::new(Config::default(), Arc::new(Silent)).max_sessions, MAX_SESSIONS);
    }
}
