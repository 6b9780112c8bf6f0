// ABOUTME: Ticket extraction from raw model output
// ABOUTME: Strips markdown code fences and validates the JSON ticket shape

use crate::ticket::{Ticket, TicketType};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("response is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unexpected response format: {0}")]
    UnexpectedFormat(&'static str),
}

/// Parses the full accumulated text of a generation or refinement stream
/// into a ticket of the expected type.
///
/// The text may optionally be wrapped in a fenced code block with any
/// language tag; the fences are stripped before parsing. The parsed value
/// must be a JSON object with a non-empty string `title`; every other
/// field is optional and defaulted.
pub fn extract_ticket(raw: &str, ticket_type: TicketType) -> Result<Ticket, ExtractError> {
    let text = strip_code_fence(raw.trim());
    let value: serde_json::Value = serde_json::from_str(text)?;

    let title = value
        .get("title")
        .and_then(|t| t.as_str())
        .ok_or(ExtractError::UnexpectedFormat("missing title"))?;
    if title.trim().is_empty() {
        return Err(ExtractError::UnexpectedFormat("empty title"));
    }

    Ok(Ticket::from_value(ticket_type, value)?)
}

/// Strips a surrounding markdown code fence (```json ... ```) if present.
fn strip_code_fence(text: &str) -> &str {
    if text.starts_with("```") {
        // Find the first newline after the opening fence
        let start = text.find('\n').map(|i| i + 1).unwrap_or(0);
        // Find the closing fence, searching from the start position so the
        // opening fence is never matched
        let end = text[start..]
            .rfind("```")
            .map(|i| i + start)
            .unwrap_or(text.len());
        text[start..end].trim()
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ticket::{BugTicket, EpicTicket, Priority, StoryTicket, TaskTicket};
    use pretty_assertions::assert_eq;

    fn sample_bug() -> Ticket {
        Ticket::Bug(BugTicket {
            title: "Login fails on mobile".to_string(),
            description: "Tapping the login button does nothing on iOS Safari.".to_string(),
            steps_to_reproduce: vec![
                "Open the site on iOS Safari".to_string(),
                "Tap Login".to_string(),
            ],
            expected_behavior: "The login form submits".to_string(),
            actual_behavior: "Nothing happens".to_string(),
            priority: Some(Priority::High),
        })
    }

    #[test]
    fn extracts_unfenced_json() {
        let json = serde_json::to_string(&sample_bug()).unwrap();
        let ticket = extract_ticket(&json, TicketType::Bug).unwrap();
        assert_eq!(ticket, sample_bug());
    }

    #[test]
    fn extracts_fenced_json_with_language_tag() {
        let json = serde_json::to_string(&sample_bug()).unwrap();
        let fenced = format!("```json\n{}\n```", json);
        let ticket = extract_ticket(&fenced, TicketType::Bug).unwrap();
        assert_eq!(ticket, sample_bug());
    }

    #[test]
    fn fenced_and_unfenced_extract_identically() {
        let json = r#"{"title":"Refactor auth","description":"","subtasks":[]}"#;
        let fenced = format!("```\n{}\n```", json);
        let plain = extract_ticket(json, TicketType::Task).unwrap();
        let stripped = extract_ticket(&fenced, TicketType::Task).unwrap();
        assert_eq!(plain, stripped);
    }

    #[test]
    fn round_trips_every_ticket_type() {
        let tickets = [
            sample_bug(),
            Ticket::Story(StoryTicket {
                title: "Dark mode".to_string(),
                description: "As a user, I want a dark theme so that my eyes rest.".to_string(),
                acceptance_criteria: vec!["Toggle persists across sessions".to_string()],
            }),
            Ticket::Task(TaskTicket {
                title: "Add DB index".to_string(),
                description: "Index the lookups on user_id.".to_string(),
                subtasks: vec!["Write migration".to_string(), "Deploy".to_string()],
            }),
            Ticket::Epic(EpicTicket {
                title: "Self-serve onboarding".to_string(),
                description: "Let new teams onboard without sales.".to_string(),
                stories: vec!["Signup flow".to_string(), "Guided tour".to_string()],
            }),
        ];

        for ticket in tickets {
            let json = serde_json::to_string(&ticket).unwrap();
            let fenced = format!("```jsonc\n{}\n```", json);
            let back = extract_ticket(&fenced, ticket.ticket_type()).unwrap();
            assert_eq!(back, ticket);
        }
    }

    #[test]
    fn rejects_missing_title() {
        let err = extract_ticket(r#"{"description":"x"}"#, TicketType::Story).unwrap_err();
        assert!(matches!(err, ExtractError::UnexpectedFormat(_)));
    }

    #[test]
    fn rejects_empty_title() {
        let err = extract_ticket(r#"{"title":"  "}"#, TicketType::Task).unwrap_err();
        assert!(matches!(err, ExtractError::UnexpectedFormat(_)));
    }

    #[test]
    fn rejects_non_string_title() {
        let err = extract_ticket(r#"{"title":42}"#, TicketType::Bug).unwrap_err();
        assert!(matches!(err, ExtractError::UnexpectedFormat(_)));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = extract_ticket("not json", TicketType::Bug).unwrap_err();
        assert!(matches!(err, ExtractError::Json(_)));
    }

    #[test]
    fn rejects_non_object_json() {
        let err = extract_ticket(r#"["a","b"]"#, TicketType::Epic).unwrap_err();
        assert!(matches!(err, ExtractError::UnexpectedFormat(_)));
    }
}
