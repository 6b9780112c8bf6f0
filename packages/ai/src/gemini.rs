// ABOUTME: Gemini streaming client for ticket generation
// ABOUTME: Calls streamGenerateContent over SSE and yields text deltas

use crate::chat::{ChatModel, ChatTurn, TextStream};
use crate::error::{provider_error_message, GenerationError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Responses are requested as structured JSON at a low sampling
/// temperature, matching what the ticket extractor expects.
const RESPONSE_MIME_TYPE: &str = "application/json";
const TEMPERATURE: f32 = 0.2;

/// Streaming chat client for the Gemini REST API.
pub struct GeminiService {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl GeminiService {
    /// Create HTTP client with timeout configuration
    fn create_client() -> Client {
        Client::builder()
            .timeout(std::time::Duration::from_secs(600))
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client")
    }

    /// Creates a new service. A missing API key is not an error here; it
    /// surfaces as [`GenerationError::MissingApiKey`] on first use.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Self::create_client(),
            api_key,
            model: DEFAULT_MODEL.to_string(),
            base_url: BASE_URL.to_string(),
        }
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Overrides the API base URL. Used by tests to point at a local mock.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Get the model being used by this service
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl ChatModel for GeminiService {
    async fn stream_chat(&self, turns: Vec<ChatTurn>) -> Result<TextStream> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or(GenerationError::MissingApiKey)?;

        let url = format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            self.base_url, self.model
        );

        let request = GenerateContentRequest {
            contents: &turns,
            generation_config: GenerationConfig {
                response_mime_type: RESPONSE_MIME_TYPE,
                temperature: TEMPERATURE,
            },
        };

        debug!(
            "Making Gemini streaming request: model={}, turns={}",
            self.model,
            turns.len()
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!("Gemini API error: {} - {}", status, body);
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message: provider_error_message(&body),
            });
        }

        // Create a stream from the response bytes
        let stream = async_stream::stream! {
            use futures::StreamExt;
            let mut byte_stream = response.bytes_stream();
            let mut buffer = String::new();

            while let Some(chunk_result) = byte_stream.next().await {
                match chunk_result {
                    Ok(bytes) => {
                        let chunk_str = String::from_utf8_lossy(&bytes).replace("\r\n", "\n");
                        buffer.push_str(&chunk_str);

                        // Process complete SSE events
                        while let Some(event_end) = buffer.find("\n\n") {
                            let event = buffer[..event_end].to_string();
                            buffer = buffer[event_end + 2..].to_string();

                            for line in event.lines() {
                                if let Some(data) = line.strip_prefix("data: ") {
                                    match parse_sse_data(data) {
                                        Ok(Some(text)) => yield Ok(text),
                                        Ok(None) => {}
                                        Err(err) => {
                                            yield Err(err);
                                            return;
                                        }
                                    }
                                }
                            }
                        }
                    }
                    Err(e) => {
                        yield Err(GenerationError::Request(e));
                        return;
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }
}

/// Parses one SSE `data:` payload into an optional text delta. A
/// JSON-shaped error payload terminates the stream with an error.
fn parse_sse_data(data: &str) -> Result<Option<String>> {
    if let Ok(chunk) = serde_json::from_str::<StreamChunk>(data) {
        if chunk.candidates.is_some() {
            return Ok(chunk.first_text());
        }
    }

    if serde_json::from_str::<serde_json::Value>(data)
        .ok()
        .map(|v| v.get("error").is_some())
        .unwrap_or(false)
    {
        return Err(GenerationError::Stream(provider_error_message(data)));
    }

    // Unknown event shapes (usage metadata, keep-alives) carry no text.
    Ok(None)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: &'a [ChatTurn],
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    temperature: f32,
}

#[derive(Deserialize)]
struct StreamChunk {
    candidates: Option<Vec<Candidate>>,
}

impl StreamChunk {
    fn first_text(self) -> Option<String> {
        self.candidates
            .and_then(|mut candidates| {
                if candidates.is_empty() {
                    None
                } else {
                    Some(candidates.remove(0))
                }
            })
            .and_then(|candidate| candidate.content)
            .and_then(|content| content.parts.into_iter().find_map(|part| part.text))
    }
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}
