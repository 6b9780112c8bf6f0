// ABOUTME: Shared CLI rendering helpers
// ABOUTME: User-facing error messages and ticket/markdown printing

use colored::*;
use ticketsmith_ai::GenerationError;
use ticketsmith_core::{ticket_to_markdown, ExtractError, Ticket};

/// Maps an error chain to the message shown to the user.
///
/// Configuration and parse failures get actionable wording; provider
/// failures surface the (already unwrapped) provider message.
pub fn error_message(err: &anyhow::Error) -> String {
    if let Some(generation) = err.downcast_ref::<GenerationError>() {
        return match generation {
            GenerationError::MissingApiKey => format!(
                "No Gemini API key configured. Run {} or set {}.",
                "ticketsmith config set-api-key".yellow(),
                "GEMINI_API_KEY".yellow()
            ),
            GenerationError::NoActiveSession => {
                "A ticket must be generated before it can be refined.".to_string()
            }
            other => format!("Failed to generate ticket: {}", other),
        };
    }

    if err.downcast_ref::<ExtractError>().is_some() {
        return "The AI returned a response in an unexpected format. Please try again."
            .to_string();
    }

    err.to_string()
}

/// Prints the ticket's markdown rendering with highlighted field labels.
pub fn print_ticket(ticket: &Ticket) {
    println!();
    for line in ticket_to_markdown(ticket).lines() {
        match line.strip_prefix("**").and_then(|rest| rest.split_once(":**")) {
            Some((label, value)) if value.is_empty() => {
                println!("{}", format!("{}:", label).cyan().bold());
            }
            Some((label, value)) => {
                println!("{}{}", format!("{}:", label).cyan().bold(), value);
            }
            None => println!("{}", line),
        }
    }
}

/// Shortens an id for table display.
pub fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_api_key_gets_actionable_wording() {
        let err = anyhow::Error::new(GenerationError::MissingApiKey);
        let message = error_message(&err);
        assert!(message.contains("config set-api-key"));
        assert!(message.contains("GEMINI_API_KEY"));
    }

    #[test]
    fn extract_errors_get_the_unexpected_format_wording() {
        let parse_err =
            ticketsmith_core::extract_ticket("not json", ticketsmith_core::TicketType::Bug)
                .unwrap_err();
        let err = anyhow::Error::new(parse_err);
        assert_eq!(
            error_message(&err),
            "The AI returned a response in an unexpected format. Please try again."
        );
    }

    #[test]
    fn other_errors_pass_through() {
        let err = anyhow::anyhow!("disk is full");
        assert_eq!(error_message(&err), "disk is full");
    }

    #[test]
    fn short_id_truncates() {
        assert_eq!(short_id("0123456789abcdef"), "01234567");
        assert_eq!(short_id("ab"), "ab");
    }
}
