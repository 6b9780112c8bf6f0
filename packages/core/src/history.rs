// ABOUTME: History item model and pure history-collection operations
// ABOUTME: Ordered newest-first, unique by id, capped at HISTORY_LIMIT entries

use crate::constants::HISTORY_LIMIT;
use crate::ticket::{Ticket, TicketType};
use serde::{Deserialize, Serialize};

/// A persisted snapshot of one completed requirement → ticket result.
///
/// Items are exclusively owned by the history collection; callers keep only
/// the `id` of the entry they are working on.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    pub id: String,
    pub requirement: String,
    pub ticket_type: TicketType,
    pub ticket: Ticket,
    /// Milliseconds since the Unix epoch; the collection sort key.
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_base64: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_mime_type: Option<String>,
}

impl HistoryItem {
    pub fn new(
        requirement: impl Into<String>,
        ticket_type: TicketType,
        ticket: Ticket,
        image_base64: Option<String>,
        image_mime_type: Option<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            requirement: requirement.into(),
            ticket_type,
            ticket,
            timestamp: chrono::Utc::now().timestamp_millis(),
            image_base64,
            image_mime_type,
        }
    }
}

// The persisted ticket object is flat and untagged, so deserialization has
// to read `ticketType` before it can pick the ticket variant.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawHistoryItem {
    id: String,
    requirement: String,
    ticket_type: TicketType,
    ticket: serde_json::Value,
    timestamp: i64,
    #[serde(default)]
    image_base64: Option<String>,
    #[serde(default)]
    image_mime_type: Option<String>,
}

impl<'de> Deserialize<'de> for HistoryItem {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = RawHistoryItem::deserialize(deserializer)?;
        let ticket =
            Ticket::from_value(raw.ticket_type, raw.ticket).map_err(serde::de::Error::custom)?;
        Ok(HistoryItem {
            id: raw.id,
            requirement: raw.requirement,
            ticket_type: raw.ticket_type,
            ticket,
            timestamp: raw.timestamp,
            image_base64: raw.image_base64,
            image_mime_type: raw.image_mime_type,
        })
    }
}

/// Removes any existing item with the same id, prepends the new item, sorts
/// newest-first and truncates to [`HISTORY_LIMIT`] entries.
///
/// All collection operations return a new sequence instead of mutating in
/// place, so callers can treat a cache update as an atomic state
/// replacement.
pub fn insert_or_replace(items: &[HistoryItem], item: HistoryItem) -> Vec<HistoryItem> {
    let mut next: Vec<HistoryItem> = items.iter().filter(|h| h.id != item.id).cloned().collect();
    next.insert(0, item);
    next.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    next.truncate(HISTORY_LIMIT);
    next
}

/// Applies `update` to the item matching `id`, then re-sorts newest-first.
/// A missing id is a no-op.
pub fn update_existing(
    items: &[HistoryItem],
    id: &str,
    update: impl FnOnce(&mut HistoryItem),
) -> Vec<HistoryItem> {
    let mut next: Vec<HistoryItem> = items.to_vec();
    if let Some(entry) = next.iter_mut().find(|h| h.id == id) {
        update(entry);
    }
    next.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    next
}

/// Filters out the item matching `id`.
pub fn remove(items: &[HistoryItem], id: &str) -> Vec<HistoryItem> {
    items.iter().filter(|h| h.id != id).cloned().collect()
}
