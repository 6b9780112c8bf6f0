// ABOUTME: Core types and operations for Ticketsmith
// ABOUTME: Ticket model, extraction, history collection, and export renderings

pub mod constants;
pub mod export;
pub mod extractor;
pub mod history;
pub mod ticket;

// Re-export main types
pub use ticket::{BugTicket, EpicTicket, Priority, StoryTicket, TaskTicket, Ticket, TicketType};

// Re-export extraction
pub use extractor::{extract_ticket, ExtractError};

// Re-export history
pub use history::{insert_or_replace, remove, update_existing, HistoryItem};

// Re-export export renderings
pub use export::{ticket_to_json, ticket_to_markdown};

// Re-export constants
pub use constants::{database_file, ticketsmith_dir, HISTORY_LIMIT, MAX_REQUIREMENT_LENGTH};
