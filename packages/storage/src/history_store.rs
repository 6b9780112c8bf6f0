// ABOUTME: Persistence for the history collection
// ABOUTME: Serializes the whole collection as one JSON blob under a fixed key

use crate::error::Result;
use crate::kv::KeyValueStore;
use std::sync::Arc;
use ticketsmith_core::HistoryItem;
use tracing::warn;

/// Fixed storage key for the serialized history collection.
pub const HISTORY_KEY: &str = "ticketHistory";

/// Loads and saves the full history collection through a [`KeyValueStore`].
pub struct HistoryStore {
    store: Arc<dyn KeyValueStore>,
}

impl HistoryStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Reads the persisted collection. A missing, unreadable, or corrupt
    /// blob yields an empty collection with a warning, never a failure.
    pub async fn load(&self) -> Vec<HistoryItem> {
        let blob = match self.store.get(HISTORY_KEY).await {
            Ok(Some(blob)) => blob,
            Ok(None) => return Vec::new(),
            Err(err) => {
                warn!("Failed to read ticket history, starting empty: {}", err);
                return Vec::new();
            }
        };

        match serde_json::from_str(&blob) {
            Ok(items) => items,
            Err(err) => {
                warn!("Ticket history failed to parse, starting empty: {}", err);
                Vec::new()
            }
        }
    }

    /// Persists the full collection. Failures propagate so the caller can
    /// decide to log and carry on; in-memory state stays authoritative for
    /// the session.
    pub async fn save(&self, items: &[HistoryItem]) -> Result<()> {
        let blob = serde_json::to_string(items)?;
        self.store.set(HISTORY_KEY, &blob).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKeyValueStore;
    use ticketsmith_core::{insert_or_replace, StoryTicket, Ticket, TicketType};

    fn sample_item(requirement: &str) -> HistoryItem {
        HistoryItem::new(
            requirement,
            TicketType::Story,
            Ticket::Story(StoryTicket {
                title: format!("Story for {}", requirement),
                description: String::new(),
                acceptance_criteria: Vec::new(),
            }),
            None,
            None,
        )
    }

    #[tokio::test]
    async fn save_then_load_round_trips_the_collection() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryKeyValueStore::new());
        let history = HistoryStore::new(Arc::clone(&store));

        let mut items = Vec::new();
        items = insert_or_replace(&items, sample_item("first"));
        items = insert_or_replace(&items, sample_item("second"));

        history.save(&items).await.unwrap();
        let loaded = history.load().await;
        assert_eq!(loaded, items);
    }

    #[tokio::test]
    async fn missing_blob_loads_as_empty() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryKeyValueStore::new());
        let history = HistoryStore::new(store);
        assert!(history.load().await.is_empty());
    }

    #[tokio::test]
    async fn corrupt_blob_loads_as_empty() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryKeyValueStore::new());
        store.set(HISTORY_KEY, "{not valid json").await.unwrap();

        let history = HistoryStore::new(store);
        assert!(history.load().await.is_empty());
    }
}
