// ABOUTME: Ticketsmith CLI entry point
// ABOUTME: Argument parsing, logging setup, and command dispatch

use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use std::path::PathBuf;
use std::process;
use ticketsmith_core::TicketType;
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::config::ConfigCommands;
use commands::history::HistoryCommands;

#[derive(Parser)]
#[command(name = "ticketsmith")]
#[command(about = "Ticketsmith CLI - draft and refine tracker tickets with AI")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a ticket from a free-text requirement
    Generate {
        /// The requirement to turn into a ticket
        requirement: String,

        /// Ticket type to generate
        #[arg(long = "type", value_enum, default_value = "story")]
        ticket_type: TicketTypeArg,

        /// Attach a screenshot for visual context (Bug tickets only)
        #[arg(long)]
        image: Option<PathBuf>,

        /// Enter the interactive refinement loop after generating
        #[arg(long)]
        refine: bool,
    },
    /// Resume a saved ticket and refine it interactively
    Refine {
        /// History entry id (a unique prefix is enough)
        id: String,
    },
    /// Manage saved tickets
    #[command(subcommand)]
    History(HistoryCommands),
    /// Export a saved ticket as Markdown or JSON
    Export {
        /// History entry id (a unique prefix is enough)
        id: String,

        #[arg(long, value_enum, default_value = "markdown")]
        format: ExportFormatArg,

        /// Write to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Configure Ticketsmith
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum TicketTypeArg {
    Bug,
    Story,
    Task,
    Epic,
}

impl From<TicketTypeArg> for TicketType {
    fn from(value: TicketTypeArg) -> Self {
        match value {
            TicketTypeArg::Bug => TicketType::Bug,
            TicketTypeArg::Story => TicketType::Story,
            TicketTypeArg::Task => TicketType::Task,
            TicketTypeArg::Epic => TicketType::Epic,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ExportFormatArg {
    Markdown,
    Json,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate {
            requirement,
            ticket_type,
            image,
            refine,
        } => commands::generate::run(requirement, ticket_type.into(), image, refine).await,
        Commands::Refine { id } => commands::refine::run(id).await,
        Commands::History(command) => commands::history::run(command).await,
        Commands::Export { id, format, output } => {
            commands::export::run(
                id,
                matches!(format, ExportFormatArg::Json),
                output,
            )
            .await
        }
        Commands::Config(command) => commands::config::run(command).await,
    };

    if let Err(err) = result {
        eprintln!("{} {}", "✗".red().bold(), output::error_message(&err));
        process::exit(1);
    }
}
