// ABOUTME: Generate command: requirement in, streamed ticket out
// ABOUTME: Validates input, streams generation, saves to history, optional refine loop

use super::{consume_stream, refine_loop, AppContext};
use crate::output;
use anyhow::Context;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use colored::*;
use std::path::{Path, PathBuf};
use ticketsmith_ai::{ImageAttachment, TicketSession};
use ticketsmith_core::{
    extract_ticket, insert_or_replace, HistoryItem, TicketType, MAX_REQUIREMENT_LENGTH,
};
use tracing::warn;

pub async fn run(
    requirement: String,
    ticket_type: TicketType,
    image: Option<PathBuf>,
    refine: bool,
) -> anyhow::Result<()> {
    let requirement = requirement.trim().to_string();
    if requirement.is_empty() {
        anyhow::bail!("Please enter a requirement.");
    }
    if requirement.chars().count() > MAX_REQUIREMENT_LENGTH {
        anyhow::bail!(
            "Requirements are capped at {} characters.",
            MAX_REQUIREMENT_LENGTH
        );
    }

    let attachment = match image {
        Some(path) if ticket_type == TicketType::Bug => Some(load_image(&path)?),
        Some(_) => {
            println!(
                "{}",
                "Images are only attached to Bug tickets; ignoring --image.".yellow()
            );
            None
        }
        None => None,
    };

    let context = AppContext::open().await?;
    let items = context.history.load().await;

    let session = TicketSession::new(context.generation_service().await?);

    println!("{}", format!("Generating {} ticket...", ticket_type).cyan());
    let stream = session
        .start_new(&requirement, ticket_type, attachment.as_ref())
        .await?;
    let full = consume_stream(stream).await?;
    let ticket = extract_ticket(&full, ticket_type)?;

    output::print_ticket(&ticket);

    let item = HistoryItem::new(
        requirement,
        ticket_type,
        ticket,
        attachment.as_ref().map(|a| a.base64.clone()),
        attachment.as_ref().map(|a| a.mime_type.clone()),
    );
    let current_id = item.id.clone();
    let items = insert_or_replace(&items, item);
    if let Err(err) = context.history.save(&items).await {
        warn!("Failed to persist ticket history: {}", err);
    }
    println!(
        "{} Saved to history as {}.",
        "✓".green().bold(),
        output::short_id(&current_id).yellow()
    );

    if refine {
        refine_loop(&session, &context, items, current_id, ticket_type).await?;
    }

    Ok(())
}

fn load_image(path: &Path) -> anyhow::Result<ImageAttachment> {
    let mime_type = image_mime_type(path)
        .ok_or_else(|| anyhow::anyhow!("Unsupported image format: {}", path.display()))?;
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read image {}", path.display()))?;
    Ok(ImageAttachment {
        base64: BASE64_STANDARD.encode(&bytes),
        mime_type: mime_type.to_string(),
    })
}

fn image_mime_type(path: &Path) -> Option<&'static str> {
    match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}
