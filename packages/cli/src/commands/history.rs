// ABOUTME: History subcommands: list, show, and delete saved tickets
// ABOUTME: Reads the persisted collection and renders it for the terminal

use super::{find_item, AppContext};
use crate::output;
use clap::Subcommand;
use colored::*;
use comfy_table::{
    modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table,
};
use ticketsmith_core::remove;

#[derive(Subcommand)]
pub enum HistoryCommands {
    /// List saved tickets, newest first
    List,
    /// Show one saved ticket
    Show { id: String },
    /// Delete a saved ticket
    Delete { id: String },
}

pub async fn run(command: HistoryCommands) -> anyhow::Result<()> {
    match command {
        HistoryCommands::List => list().await,
        HistoryCommands::Show { id } => show(&id).await,
        HistoryCommands::Delete { id } => delete(&id).await,
    }
}

async fn list() -> anyhow::Result<()> {
    let context = AppContext::open().await?;
    let items = context.history.load().await;

    if items.is_empty() {
        println!("{}", "No saved tickets".yellow());
        println!(
            "{}",
            "Use 'ticketsmith generate' to create your first ticket".dimmed()
        );
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec!["ID", "Type", "Title", "Updated"]);

    for item in &items {
        table.add_row(vec![
            output::short_id(&item.id),
            item.ticket_type.to_string(),
            truncate(item.ticket.title(), 40),
            format_timestamp(item.timestamp),
        ]);
    }

    println!("{}", table);
    println!(
        "Total: {} tickets",
        items.len().to_string().cyan()
    );

    Ok(())
}

async fn show(id: &str) -> anyhow::Result<()> {
    let context = AppContext::open().await?;
    let items = context.history.load().await;
    let item = find_item(&items, id)?;

    println!(
        "{}",
        format!("{} ticket {}", item.ticket_type, output::short_id(&item.id))
            .blue()
            .bold()
    );
    println!("{} {}", "Requirement:".cyan().bold(), item.requirement);
    println!(
        "{} {}",
        "Updated:".cyan().bold(),
        format_timestamp(item.timestamp)
    );
    if item.image_base64.is_some() {
        println!("{} attached", "Image:".cyan().bold());
    }
    output::print_ticket(&item.ticket);

    Ok(())
}

async fn delete(id: &str) -> anyhow::Result<()> {
    let context = AppContext::open().await?;
    let items = context.history.load().await;
    let item = find_item(&items, id)?;
    let deleted_id = item.id.clone();

    let next = remove(&items, &deleted_id);
    context.history.save(&next).await?;

    println!(
        "{} Deleted ticket {}.",
        "✓".green().bold(),
        output::short_id(&deleted_id).yellow()
    );
    Ok(())
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{}…", kept)
    }
}

fn format_timestamp(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "—".to_string())
}
