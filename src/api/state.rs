use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    config::Config,
    db::MemoryStore,
    error::{AppError, AppResult},
    models::ViewMode,
    services::{Blocklist, HttpSearchProvider, SearchController, SearchProvider},
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub inner: Arc<RwLock<AppStateInner>>,
    pub store: Arc<MemoryStore>,
    pub provider: Arc<dyn SearchProvider>,
    pub blocklist: Arc<Blocklist>,
    pub default_view_mode: ViewMode,
    pub session_idle: Duration,
    pub max_sessions: usize,
}

struct SessionEntry {
    controller: Arc<SearchController>,
    last_used: Instant,
}

/// Live search sessions by id
#[derive(Default)]
pub struct AppStateInner {
    sessions: HashMap<Uuid, SessionEntry>,
}

impl AppStateInner {
    /// Drops sessions idle for at least `idle`, returning how many went
    fn prune_idle(&mut self, now: Instant, idle: Duration) -> usize {
        let before = self.sessions.len();
        self.sessions
            .retain(|_, entry| now.duration_since(entry.last_used) < idle);
        before - self.sessions.len()
    }

    fn evict_least_recent(&mut self) -> Option<Uuid> {
        let id = self
            .sessions
            .iter()
            .min_by_key(|(_, entry)| entry.last_used)
            .map(|(id, _)| *id)?;
        self.sessions.remove(&id);
        Some(id)
    }
}

impl AppState {
    /// Wires the state around an existing provider
    pub fn new(config: &Config, provider: Arc<dyn SearchProvider>) -> Self {
        let blocklist = Blocklist::new(config.moderation_terms(), !config.disable_moderation_filter);

        Self {
            inner: Arc::new(RwLock::new(AppStateInner::default())),
            store: Arc::new(MemoryStore::new(config.history_limit)),
            provider,
            blocklist: Arc::new(blocklist),
            default_view_mode: config.default_view_mode(),
            session_idle: Duration::from_secs(config.session_idle_secs),
            max_sessions: config.max_sessions.max(1),
        }
    }

    /// State backed by the HTTP search provider at `SEARCH_API_URL`
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let provider = HttpSearchProvider::new(
            config.search_api_url.clone(),
            Duration::from_secs(config.search_timeout_secs),
        )?;
        Ok(Self::new(config, Arc::new(provider)))
    }

    pub async fn create_session(&self) -> (Uuid, Arc<SearchController>) {
        let controller = Arc::new(
            SearchController::new(
                Arc::clone(&self.provider),
                self.store.clone(),
                Arc::clone(&self.blocklist),
                self.default_view_mode,
            )
            .await,
        );

        let id = Uuid::new_v4();
        let mut inner = self.inner.write().await;
        let now = Instant::now();

        let expired = inner.prune_idle(now, self.session_idle);
        if expired > 0 {
            tracing::info!(expired, "Dropped idle sessions");
        }
        while inner.sessions.len() >= self.max_sessions {
            match inner.evict_least_recent() {
                Some(evicted) => {
                    tracing::info!(session = %evicted, "Evicted least recently used session")
                }
                None => break,
            }
        }

        inner.sessions.insert(
            id,
            SessionEntry {
                controller: Arc::clone(&controller),
                last_used: now,
            },
        );
        tracing::info!(session = %id, sessions = inner.sessions.len(), "Session created");

        (id, controller)
    }

    /// Looks up a live session and marks it as used
    pub async fn session(&self, id: Uuid) -> AppResult<Arc<SearchController>> {
        let mut inner = self.inner.write().await;
        let now = Instant::now();

        let entry = inner
            .sessions
            .get_mut(&id)
            .ok_or(AppError::SessionNotFound(id))?;
        if now.duration_since(entry.last_used) < self.session_idle {
            entry.last_used = now;
            return Ok(Arc::clone(&entry.controller));
        }

        inner.sessions.remove(&id);
        tracing::info!(session = %id, "Session expired");
        Err(AppError::SessionNotFound(id))
    }

    pub async fn remove_session(&self, id: Uuid) -> AppResult<()> {
        let removed = self.inner.write().await.sessions.remove(&id);
        match removed {
            Some(_) => {
                tracing::info!(session = %id, "Session closed");
                Ok(())
            }
            None => Err(AppError::SessionNotFound(id)),
        }
    }
}
