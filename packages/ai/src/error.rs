// ABOUTME: Error types for generation and streaming
// ABOUTME: Covers configuration, session-state, transport, and provider failures

use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerationError {
    /// No API key is configured; surfaced before any network interaction.
    #[error("No API key configured")]
    MissingApiKey,

    /// A refinement was requested with no active session.
    #[error("No active session")]
    NoActiveSession,

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Streaming error: {0}")]
    Stream(String),
}

pub type Result<T> = std::result::Result<T, GenerationError>;

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

/// Extracts a human-readable message from a provider error payload.
///
/// Tries the nested `error.message` of a JSON-shaped body first, falls back
/// to the raw body, and finally to a generic message when the body is
/// empty.
pub fn provider_error_message(body: &str) -> String {
    if let Ok(wrapper) = serde_json::from_str::<ErrorWrapper>(body) {
        let status = wrapper.error.status.unwrap_or_default();
        let message = wrapper
            .error
            .message
            .unwrap_or_else(|| body.trim().to_string());
        return if status.is_empty() {
            message
        } else {
            format!("{}: {}", status, message)
        };
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        "An unexpected error occurred.".to_string()
    } else {
        trimmed.to_string()
    }
}
