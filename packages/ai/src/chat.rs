// ABOUTME: Chat turn model and the streaming chat-model trait
// ABOUTME: Wire-compatible roles, text/inline-data parts, and the text fragment stream

use crate::error::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

/// One piece of a turn: text, or an inline binary attachment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }

    pub fn inline_data(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Part::InlineData {
            inline_data: InlineData {
                mime_type: mime_type.into(),
                data: data.into(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

/// One turn of the conversation held by a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub parts: Vec<Part>,
}

impl ChatTurn {
    pub fn user(parts: Vec<Part>) -> Self {
        Self {
            role: ChatRole::User,
            parts,
        }
    }

    pub fn model_text(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            parts: vec![Part::text(text)],
        }
    }

    /// Concatenated text content of the turn, ignoring inline data parts.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                Part::Text { text } => Some(text.as_str()),
                Part::InlineData { .. } => None,
            })
            .collect()
    }
}

/// A lazy, single-pass, forward-only sequence of text fragments.
///
/// Each item is a non-cumulative delta; callers accumulate by simple
/// concatenation, in emission order. The stream is not restartable:
/// consuming it twice is undefined because the underlying model context
/// has already advanced.
pub type TextStream = BoxStream<'static, Result<String>>;

/// A streaming chat model.
///
/// One operation: given the full prior turn list, open a single model call
/// and return the reply as a [`TextStream`]. Implementations hold their own
/// credentials and request configuration.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn stream_chat(&self, turns: Vec<ChatTurn>) -> Result<TextStream>;
}
