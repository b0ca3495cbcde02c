use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::{EventBus, HistoryStore, LibraryStore, StoreEvent, Subscription, Topic};
use crate::{
    error::{AppError, AppResult},
    models::{Favorite, PlayRecord, StorageKey},
};

#[derive(Default)]
struct StoreData {
    history: Vec<String>,
    favorites: BTreeMap<String, Favorite>,
    play_records: BTreeMap<String, PlayRecord>,
}

/// Process-local store for history, favorites and play records
///
/// Each mutation publishes a full snapshot of the touched collection on
/// the store's [`EventBus`] before releasing the write lock, so
/// subscribers see snapshots in the order the writes happened.
pub struct MemoryStore {
    data: RwLock<StoreData>,
    bus: EventBus,
    history_limit: usize,
}

impl MemoryStore {
    pub fn new(history_limit: usize) -> Self {
        Self {
            data: RwLock::new(StoreData::default()),
            bus: EventBus::new(),
            history_limit,
        }
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }
}

#[async_trait::async_trait]
impl HistoryStore for MemoryStore {
    async fn history(&self) -> AppResult<Vec<String>> {
        Ok(self.data.read().await.history.clone())
    }

    async fn add_history(&self, query: &str) -> AppResult<()> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::InvalidInput(
                "History entry cannot be empty".to_string(),
            ));
        }

        let mut data = self.data.write().await;
        data.history.retain(|entry| entry != query);
        data.history.insert(0, query.to_string());
        data.history.truncate(self.history_limit);

        tracing::debug!(entries = data.history.len(), "Search history updated");
        self.bus.publish(StoreEvent::SearchHistory(data.history.clone()));
        Ok(())
    }

    async fn delete_history(&self, query: &str) -> AppResult<()> {
        let mut data = self.data.write().await;
        data.history.retain(|entry| entry != query);
        self.bus.publish(StoreEvent::SearchHistory(data.history.clone()));
        Ok(())
    }

    async fn clear_history(&self) -> AppResult<()> {
        let mut data = self.data.write().await;
        data.history.clear();
        self.bus.publish(StoreEvent::SearchHistory(Vec::new()));
        Ok(())
    }

    fn subscribe(
        &self,
        topic: Topic,
        handler: Box<dyn Fn(&StoreEvent) + Send + Sync>,
    ) -> Subscription {
        self.bus.subscribe(topic, handler)
    }
}

#[async_trait::async_trait]
impl LibraryStore for MemoryStore {
    async fn favorites(&self) -> AppResult<BTreeMap<String, Favorite>> {
        Ok(self.data.read().await.favorites.clone())
    }

    async fn favorite(&self, key: &StorageKey) -> AppResult<Option<Favorite>> {
        Ok(self.data.read().await.favorites.get(&key.to_string()).cloned())
    }

    async fn save_favorite(&self, key: &StorageKey, favorite: Favorite) -> AppResult<()> {
        let mut data = self.data.write().await;
        data.favorites.insert(key.to_string(), favorite);
        self.bus.publish(StoreEvent::Favorites(data.favorites.clone()));
        Ok(())
    }

    async fn delete_favorite(&self, key: &StorageKey) -> AppResult<()> {
        let mut data = self.data.write().await;
        if data.favorites.remove(&key.to_string()).is_none() {
            return Err(AppError::NotFound(format!("Favorite {}", key)));
        }
        self.bus.publish(StoreEvent::Favorites(data.favorites.clone()));
        Ok(())
    }

    async fn clear_favorites(&self) -> AppResult<()> {
        let mut data = self.data.write().await;
        data.favorites.clear();
        self.bus.publish(StoreEvent::Favorites(BTreeMap::new()));
        Ok(())
    }

    async fn play_records(&self) -> AppResult<BTreeMap<String, PlayRecord>> {
        Ok(self.data.read().await.play_records.clone())
    }

    async fn save_play_record(&self, key: &StorageKey, record: PlayRecord) -> AppResult<()> {
        let mut data = self.data.write().await;
        data.play_records.insert(key.to_string(), record);
        self.bus.publish(StoreEvent::PlayRecords(data.play_records.clone()));
        Ok(())
    }

    async fn delete_play_record(&self, key: &StorageKey) -> AppResult<()> {
        let mut data = self.data.write().await;
        if data.play_records.remove(&key.to_string()).is_none() {
            return Err(AppError::NotFound(format!("Play record {}", key)));
        }
        self.bus.publish(StoreEvent::PlayRecords(data.play_records.clone()));
        Ok(())
    }
}
