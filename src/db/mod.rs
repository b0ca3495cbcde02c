use std::collections::BTreeMap;

use crate::{
    error::AppResult,
    models::{Favorite, PlayRecord, StorageKey},
};

pub mod events;
pub mod memory;

pub use events::{EventBus, StoreEvent, Subscription, Topic};
pub use memory::MemoryStore;

/// Search history, most recent first
///
/// Every mutation publishes the new snapshot on [`Topic::SearchHistory`].
#[async_trait::async_trait]
pub trait HistoryStore: Send + Sync {
    async fn history(&self) -> AppResult<Vec<String>>;

    /// Records `query` as the most recent entry
    async fn add_history(&self, query: &str) -> AppResult<()>;

    async fn delete_history(&self, query: &str) -> AppResult<()>;

    async fn clear_history(&self) -> AppResult<()>;

    /// Change notifications for any topic this store publishes
    fn subscribe(
        &self,
        topic: Topic,
        handler: Box<dyn Fn(&StoreEvent) + Send + Sync>,
    ) -> Subscription;
}

/// Favorites and play records keyed by `source+id`
#[async_trait::async_trait]
pub trait LibraryStore: Send + Sync {
    async fn favorites(&self) -> AppResult<BTreeMap<String, Favorite>>;

    async fn favorite(&self, key: &StorageKey) -> AppResult<Option<Favorite>>;

    async fn save_favorite(&self, key: &StorageKey, favorite: Favorite) -> AppResult<()>;

    async fn delete_favorite(&self, key: &StorageKey) -> AppResult<()>;

    async fn clear_favorites(&self) -> AppResult<()>;

    async fn play_records(&self) -> AppResult<BTreeMap<String, PlayRecord>>;

    async fn save_play_record(&self, key: &StorageKey, record: PlayRecord) -> AppResult<()>;

    async fn delete_play_record(&self, key: &StorageKey) -> AppResult<()>;

    async fn is_favorited(&self, key: &StorageKey) -> AppResult<bool> {
        Ok(self.favorite(key).await?.is_some())
    }
}
