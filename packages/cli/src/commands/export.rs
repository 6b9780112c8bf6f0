// ABOUTME: Export command: render a saved ticket as Markdown or JSON
// ABOUTME: Writes to a file or stdout; absent fields are skipped by the renderer

use super::{find_item, AppContext};
use anyhow::Context;
use colored::*;
use std::path::PathBuf;
use ticketsmith_core::{ticket_to_json, ticket_to_markdown};

pub async fn run(id: String, json: bool, output_path: Option<PathBuf>) -> anyhow::Result<()> {
    let context = AppContext::open().await?;
    let items = context.history.load().await;
    let item = find_item(&items, &id)?;

    let content = if json {
        ticket_to_json(&item.ticket)
    } else {
        ticket_to_markdown(&item.ticket)
    };

    match output_path {
        Some(path) => {
            std::fs::write(&path, &content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!(
                "{} Exported \"{}\" to {}.",
                "✓".green().bold(),
                item.ticket.title(),
                path.display().to_string().yellow()
            );
        }
        None => print!("{}", content),
    }

    Ok(())
}
