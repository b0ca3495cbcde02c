use std::collections::BTreeMap;
use std::fmt::Display;
use std::sync::Arc;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::AbortHandle;

use crate::models::{Favorite, PlayRecord};

/// Per-topic buffer; a subscriber that falls further behind skips ahead
const EVENT_CAPACITY: usize = 64;

/// Logical change notifications published by the stores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    SearchHistory,
    Favorites,
    PlayRecords,
}

impl Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Topic::SearchHistory => write!(f, "searchHistoryUpdated"),
            Topic::Favorites => write!(f, "favoritesUpdated"),
            Topic::PlayRecords => write!(f, "playRecordsUpdated"),
        }
    }
}

/// Full snapshot published after every change
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    SearchHistory(Vec<String>),
    Favorites(BTreeMap<String, Favorite>),
    PlayRecords(BTreeMap<String, PlayRecord>),
}

impl StoreEvent {
    pub fn topic(&self) -> Topic {
        match self {
            StoreEvent::SearchHistory(_) => Topic::SearchHistory,
            StoreEvent::Favorites(_) => Topic::Favorites,
            StoreEvent::PlayRecords(_) => Topic::PlayRecords,
        }
    }
}

struct Channels {
    search_history: broadcast::Sender<StoreEvent>,
    favorites: broadcast::Sender<StoreEvent>,
    play_records: broadcast::Sender<StoreEvent>,
}

/// Publish/subscribe hub with one broadcast channel per [`Topic`]
///
/// Events reach each subscriber in publish order. Publishers that need
/// snapshots to arrive in the order they were taken must publish while
/// still holding the lock that guards the data.
#[derive(Clone)]
pub struct EventBus {
    channels: Arc<Channels>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let channel = || broadcast::channel(EVENT_CAPACITY).0;
        Self {
            channels: Arc::new(Channels {
                search_history: channel(),
                favorites: channel(),
                play_records: channel(),
            }),
        }
    }

    fn sender(&self, topic: Topic) -> &broadcast::Sender<StoreEvent> {
        match topic {
            Topic::SearchHistory => &self.channels.search_history,
            Topic::Favorites => &self.channels.favorites,
            Topic::PlayRecords => &self.channels.play_records,
        }
    }

    /// Runs `handler` for every event on `topic` until the returned guard
    /// is dropped. Must be called inside a tokio runtime.
    pub fn subscribe<F>(&self, topic: Topic, handler: F) -> Subscription
    where
        F: Fn(&StoreEvent) + Send + Sync + 'static,
    {
        let mut receiver = self.sender(topic).subscribe();

        let task = tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(event) => handler(&event),
                    // snapshots: the next one supersedes whatever was missed
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(topic = %topic, skipped, "Subscriber lagged behind");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        tracing::trace!(topic = %topic, "Subscribed");

        Subscription {
            topic,
            task: task.abort_handle(),
        }
    }

    pub fn publish(&self, event: StoreEvent) {
        let topic = event.topic();
        // no receivers is not an error
        let delivered = self.sender(topic).send(event).unwrap_or(0);
        tracing::trace!(topic = %topic, subscribers = delivered, "Published store event");
    }
}

/// Live subscription; dropping it unsubscribes
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    topic: Topic,
    task: AbortHandle,
}

impl Subscription {
    pub fn topic(&self) -> Topic {
        self.topic
    }

    pub fn unsubscribe(self) {
        // Drop does the work
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}
