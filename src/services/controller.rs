use std::sync::{Arc, PoisonError, RwLock as StdRwLock};
use tokio::sync::RwLock;

use crate::{
    db::{HistoryStore, StoreEvent, Subscription, Topic},
    models::{FilterUpdate, ViewMode},
};

use super::{
    moderation::Blocklist,
    providers::SearchProvider,
    session::{QueryOrigin, SearchSession, SearchView},
};

/// Drives one user's [`SearchSession`]
///
/// The session lock is never held across the provider call: the query is
/// started under the lock, the provider is awaited without it, and the
/// outcome is delivered under the lock again with the ticket issued at the
/// start. The history shown in views follows the store's change events.
pub struct SearchController {
    provider: Arc<dyn SearchProvider>,
    history: Arc<dyn HistoryStore>,
    blocklist: Arc<Blocklist>,
    session: RwLock<SearchSession>,
    /// Latest history snapshot, kept live by the store subscription
    history_view: Arc<StdRwLock<Vec<String>>>,
    _history_subscription: Subscription,
}

impl SearchController {
    /// Creates a controller whose session starts in `view_mode`
    pub async fn new(
        provider: Arc<dyn SearchProvider>,
        history: Arc<dyn HistoryStore>,
        blocklist: Arc<Blocklist>,
        view_mode: ViewMode,
    ) -> Self {
        let initial = history.history().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load search history");
            Vec::new()
        });
        let history_view = Arc::new(StdRwLock::new(initial));

        let sink = Arc::clone(&history_view);
        let subscription = history.subscribe(
            Topic::SearchHistory,
            Box::new(move |event| {
                if let StoreEvent::SearchHistory(entries) = event {
                    *sink.write().unwrap_or_else(PoisonError::into_inner) = entries.clone();
                }
            }),
        );

        Self {
            provider,
            history,
            blocklist,
            session: RwLock::new(SearchSession::new(view_mode)),
            history_view,
            _history_subscription: subscription,
        }
    }

    pub fn history(&self) -> Vec<String> {
        self.history_view
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Runs a query end to end.
    ///
    /// Returns `None` without touching any state when the query is blank.
    /// Provider failures are logged and leave the session `Failed`; they
    /// never reach the caller.
    pub async fn submit(&self, raw_query: &str, origin: QueryOrigin) -> Option<SearchView> {
        let query = origin.normalize(raw_query)?;

        let ticket = self.session.write().await.begin(query.clone());

        tracing::info!(
            query = %query,
            generation = ticket.generation(),
            provider = self.provider.name(),
            "Search started"
        );

        if let Err(e) = self.history.add_history(&query).await {
            tracing::warn!(error = %e, "Failed to record search history");
        }

        let outcome = self
            .provider
            .search(&query)
            .await
            .map(|hits| self.blocklist.retain_allowed(hits));

        if let Err(e) = &outcome {
            tracing::warn!(query = %query, error = %e, "Search provider failed");
        }

        let mut session = self.session.write().await;
        if session.complete(ticket, outcome) {
            tracing::info!(
                query = %query,
                phase = ?session.phase(),
                hits = session.raw_hits().len(),
                results = session.results().len(),
                "Search completed"
            );
        } else {
            tracing::debug!(
                query = %query,
                generation = ticket.generation(),
                current = session.generation(),
                "Discarded stale search response"
            );
        }

        Some(session.view(self.history()))
    }

    /// Navigation without a query: back to idle
    pub async fn reset(&self) -> SearchView {
        let mut session = self.session.write().await;
        session.reset();
        session.view(self.history())
    }

    pub async fn view(&self) -> SearchView {
        self.session.read().await.view(self.history())
    }

    pub async fn update_filters(&self, update: FilterUpdate) -> SearchView {
        let mut session = self.session.write().await;
        session.update_filters(update);
        tracing::debug!(filters = ?session.filters(), "Filters updated");
        session.view(self.history())
    }

    pub async fn clear_filters(&self) -> SearchView {
        let mut session = self.session.write().await;
        session.clear_filters();
        session.view(self.history())
    }

    pub async fn set_view_mode(&self, view_mode: ViewMode) -> SearchView {
        let mut session = self.session.write().await;
        session.set_view_mode(view_mode);
        session.view(self.history())
    }

    pub async fn toggle_view_mode(&self) -> SearchView {
        let mut session = self.session.write().await;
        session.toggle_view_mode();
        session.view(self.history())
    }
}
