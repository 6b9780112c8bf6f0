// ABOUTME: Generation service integration for Ticketsmith
// ABOUTME: Gemini streaming client, chat turn model, and the ticket session

pub mod chat;
pub mod error;
pub mod gemini;
pub mod session;

// Re-export chat types
pub use chat::{ChatModel, ChatRole, ChatTurn, InlineData, Part, TextStream};

// Re-export error types
pub use error::{provider_error_message, GenerationError, Result};

// Re-export the Gemini client and session
pub use gemini::GeminiService;
pub use session::{ImageAttachment, TicketSession};
