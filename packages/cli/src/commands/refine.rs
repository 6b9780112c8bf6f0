// ABOUTME: Refine command: resume a saved ticket in a fresh session
// ABOUTME: Re-primes the chat context from the snapshot, then loops on instructions

use super::{find_item, refine_loop, AppContext};
use crate::output;
use colored::*;
use ticketsmith_ai::TicketSession;

pub async fn run(id: String) -> anyhow::Result<()> {
    let context = AppContext::open().await?;
    let items = context.history.load().await;
    let item = find_item(&items, &id)?.clone();

    let session = TicketSession::new(context.generation_service().await?);
    session.load_from_snapshot(&item);

    println!(
        "{}",
        format!(
            "Resumed {} ticket \"{}\"",
            item.ticket_type,
            item.ticket.title()
        )
        .cyan()
    );
    output::print_ticket(&item.ticket);

    refine_loop(&session, &context, items, item.id.clone(), item.ticket_type).await?;
    Ok(())
}
