// ABOUTME: Config subcommands for the API credential and data directory
// ABOUTME: Stores the Gemini key through the credential store; never echoes it

use super::AppContext;
use clap::Subcommand;
use colored::*;
use inquire::{Password, PasswordDisplayMode};
use ticketsmith_core::ticketsmith_dir;
use ticketsmith_storage::{CredentialStore, API_KEY_ENV};

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Store the Gemini API key
    SetApiKey,
    /// Remove the stored API key
    ClearApiKey,
    /// Show configuration status
    Show,
}

pub async fn run(command: ConfigCommands) -> anyhow::Result<()> {
    match command {
        ConfigCommands::SetApiKey => set_api_key().await,
        ConfigCommands::ClearApiKey => clear_api_key().await,
        ConfigCommands::Show => show().await,
    }
}

async fn set_api_key() -> anyhow::Result<()> {
    let key = Password::new("Gemini API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_help_message("Create one at https://aistudio.google.com/app/apikey")
        .prompt()?;

    let key = key.trim();
    if key.is_empty() {
        anyhow::bail!("No key entered; nothing saved.");
    }

    let context = AppContext::open().await?;
    context.credentials.set_api_key(key).await?;
    println!("{} API key saved.", "✓".green().bold());
    Ok(())
}

async fn clear_api_key() -> anyhow::Result<()> {
    let context = AppContext::open().await?;
    context.credentials.clear_api_key().await?;
    println!("{} Stored API key removed.", "✓".green().bold());
    Ok(())
}

async fn show() -> anyhow::Result<()> {
    let context = AppContext::open().await?;

    println!("{}", "Ticketsmith configuration".blue().bold());
    println!(
        "{} {}",
        "Data directory:".cyan().bold(),
        ticketsmith_dir().display()
    );

    let stored = context.credentials.stored_api_key().await?.is_some();
    let from_env = CredentialStore::env_api_key().is_some();
    let status = match (from_env, stored) {
        (true, _) => format!("configured (via {})", API_KEY_ENV),
        (false, true) => "configured (stored)".to_string(),
        (false, false) => "not configured".yellow().to_string(),
    };
    println!("{} {}", "Gemini API key:".cyan().bold(), status);

    Ok(())
}
