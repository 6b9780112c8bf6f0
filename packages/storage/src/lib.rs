// ABOUTME: Data layer and persistence for Ticketsmith
// ABOUTME: Key-value capability trait, SQLite backing, history and credential stores

pub mod credentials;
pub mod error;
pub mod history_store;
pub mod kv;

// Re-export the key-value capability and implementations
pub use kv::{KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore};

// Re-export the stores
pub use credentials::{CredentialStore, API_KEY_ENV, API_KEY_KEY};
pub use history_store::{HistoryStore, HISTORY_KEY};

// Re-export errors
pub use error::{Result, StorageError};
