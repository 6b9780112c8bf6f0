// ABOUTME: CLI command implementations and shared orchestration plumbing
// ABOUTME: Store context, stream consumption, and the interactive refine loop

pub mod config;
pub mod export;
pub mod generate;
pub mod history;
pub mod refine;

use crate::output;
use colored::*;
use inquire::InquireError;
use std::sync::Arc;
use ticketsmith_ai::{ChatModel, GeminiService, TextStream, TicketSession};
use ticketsmith_core::{extract_ticket, update_existing, HistoryItem, Ticket, TicketType};
use ticketsmith_storage::{CredentialStore, HistoryStore, KeyValueStore, SqliteKeyValueStore};
use tracing::warn;

/// Shared handles to the durable stores, opened once per command.
pub struct AppContext {
    pub history: HistoryStore,
    pub credentials: CredentialStore,
}

impl AppContext {
    pub async fn open() -> anyhow::Result<Self> {
        let store: Arc<dyn KeyValueStore> = Arc::new(SqliteKeyValueStore::open_default().await?);
        Ok(Self {
            history: HistoryStore::new(Arc::clone(&store)),
            credentials: CredentialStore::new(store),
        })
    }

    /// Builds the generation service from the configured credential. A
    /// missing key is not an error yet; it surfaces on first use.
    pub async fn generation_service(&self) -> anyhow::Result<GeminiService> {
        let api_key = self.credentials.api_key().await?;
        let mut service = GeminiService::new(api_key);
        if let Ok(model) = std::env::var("GEMINI_MODEL") {
            if !model.trim().is_empty() {
                service = service.with_model(model);
            }
        }
        Ok(service)
    }
}

/// Resolves a history entry by exact id or unique prefix.
pub fn find_item<'a>(items: &'a [HistoryItem], id: &str) -> anyhow::Result<&'a HistoryItem> {
    if let Some(item) = items.iter().find(|h| h.id == id) {
        return Ok(item);
    }

    let mut matches = items.iter().filter(|h| h.id.starts_with(id));
    match (matches.next(), matches.next()) {
        (Some(item), None) => Ok(item),
        (Some(_), Some(_)) => anyhow::bail!("Id prefix '{}' is ambiguous.", id),
        _ => anyhow::bail!("No saved ticket matches '{}'.", id),
    }
}

/// Drains a fragment stream, echoing each fragment as it arrives, and
/// returns the accumulated text. A mid-stream failure discards the partial
/// text.
pub async fn consume_stream(mut stream: TextStream) -> anyhow::Result<String> {
    use futures::StreamExt;
    use std::io::Write;

    let mut full = String::new();
    while let Some(fragment) = stream.next().await {
        let fragment = fragment?;
        print!("{}", fragment.dimmed());
        let _ = std::io::stdout().flush();
        full.push_str(&fragment);
    }
    println!();
    Ok(full)
}

/// Interactive refinement loop over an active session.
///
/// Each successful refinement replaces the ticket on the tracked history
/// entry and persists; a failed refinement leaves the previous ticket and
/// history untouched and the loop continues.
pub async fn refine_loop<M: ChatModel>(
    session: &TicketSession<M>,
    context: &AppContext,
    mut items: Vec<HistoryItem>,
    current_id: String,
    ticket_type: TicketType,
) -> anyhow::Result<Vec<HistoryItem>> {
    loop {
        let instruction =
            match inquire::Text::new("Refine ticket (leave empty to finish):").prompt() {
                Ok(instruction) => instruction,
                Err(InquireError::OperationCanceled)
                | Err(InquireError::OperationInterrupted) => break,
                Err(err) => return Err(err.into()),
            };
        if instruction.trim().is_empty() {
            break;
        }

        match run_refinement(session, &instruction, ticket_type).await {
            Ok(ticket) => {
                println!("{} Ticket refined.", "✓".green().bold());
                output::print_ticket(&ticket);

                items = update_existing(&items, &current_id, |entry| {
                    entry.ticket = ticket.clone();
                    entry.timestamp = chrono::Utc::now().timestamp_millis();
                });
                if let Err(err) = context.history.save(&items).await {
                    warn!("Failed to persist ticket history: {}", err);
                }
            }
            Err(err) => {
                eprintln!("{} {}", "✗".red().bold(), output::error_message(&err));
            }
        }
    }

    Ok(items)
}

async fn run_refinement<M: ChatModel>(
    session: &TicketSession<M>,
    instruction: &str,
    ticket_type: TicketType,
) -> anyhow::Result<Ticket> {
    let stream = session.refine(instruction).await?;
    let full = consume_stream(stream).await?;
    Ok(extract_ticket(&full, ticket_type)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ticketsmith_core::{StoryTicket, Ticket};

    fn item_with_id(id: &str) -> HistoryItem {
        HistoryItem {
            id: id.to_string(),
            requirement: "r".to_string(),
            ticket_type: TicketType::Story,
            ticket: Ticket::Story(StoryTicket {
                title: "t".to_string(),
                description: String::new(),
                acceptance_criteria: Vec::new(),
            }),
            timestamp: 0,
            image_base64: None,
            image_mime_type: None,
        }
    }

    #[test]
    fn find_item_prefers_exact_match() {
        let items = vec![item_with_id("abc"), item_with_id("abcdef")];
        assert_eq!(find_item(&items, "abc").unwrap().id, "abc");
    }

    #[test]
    fn find_item_accepts_a_unique_prefix() {
        let items = vec![item_with_id("abcdef"), item_with_id("xyz123")];
        assert_eq!(find_item(&items, "xyz").unwrap().id, "xyz123");
    }

    #[test]
    fn find_item_rejects_ambiguous_prefixes_and_misses() {
        let items = vec![item_with_id("abc111"), item_with_id("abc222")];
        assert!(find_item(&items, "abc").is_err());
        assert!(find_item(&items, "zzz").is_err());
    }
}
