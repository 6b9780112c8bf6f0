// ABOUTME: Ticket generation session state machine
// ABOUTME: Owns the single live chat context; start, refine, and snapshot restore

use crate::chat::{ChatModel, ChatTurn, Part, TextStream};
use crate::error::{GenerationError, Result};
use std::sync::{Arc, Mutex};
use ticketsmith_core::{HistoryItem, TicketType};
use ticketsmith_prompts::{build_prompt, build_refine_prompt};
use tracing::debug;

/// An image supplied alongside a Bug requirement. The payload may be a raw
/// base64 string or a full `data:` URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageAttachment {
    pub base64: String,
    pub mime_type: String,
}

/// The single live conversational context against the generation service.
///
/// At most one context is active at a time: starting a new generation or
/// loading a snapshot replaces the previous context unconditionally. The
/// session owns no history; it is pure conversational continuity state.
///
/// The streams returned by [`start_new`](Self::start_new) and
/// [`refine`](Self::refine) are lazy, single-pass, and non-restartable.
/// When a stream completes successfully, the accumulated reply is appended
/// to the context so a subsequent refinement continues naturally; when it
/// fails mid-flight, the context keeps the already-sent user turn and is
/// not rolled back.
pub struct TicketSession<M: ChatModel> {
    model: M,
    context: Arc<Mutex<Option<Vec<ChatTurn>>>>,
}

impl<M: ChatModel> TicketSession<M> {
    pub fn new(model: M) -> Self {
        Self {
            model,
            context: Arc::new(Mutex::new(None)),
        }
    }

    /// Whether a conversational context is currently established.
    pub fn is_active(&self) -> bool {
        self.context.lock().expect("session context poisoned").is_some()
    }

    /// Starts a new generation, discarding any prior context.
    ///
    /// The image is attached only when the ticket type is Bug and the
    /// payload is non-empty after stripping its encoding header.
    pub async fn start_new(
        &self,
        requirement: &str,
        ticket_type: TicketType,
        image: Option<&ImageAttachment>,
    ) -> Result<TextStream> {
        let prompt = build_prompt(requirement, ticket_type);
        let mut parts = vec![Part::text(prompt)];
        if ticket_type == TicketType::Bug {
            if let Some(part) = image.and_then(image_part) {
                parts.push(part);
            }
        }

        let turns = vec![ChatTurn::user(parts)];
        let inner = self.model.stream_chat(turns.clone()).await?;

        debug!("Started new generation session (type: {})", ticket_type);
        *self.context.lock().expect("session context poisoned") = Some(turns);
        Ok(self.track_reply(inner))
    }

    /// Appends a refinement instruction to the active context and streams
    /// the model's complete replacement ticket.
    pub async fn refine(&self, instruction: &str) -> Result<TextStream> {
        let turns = {
            let guard = self.context.lock().expect("session context poisoned");
            let existing = guard.as_ref().ok_or(GenerationError::NoActiveSession)?;
            let mut turns = existing.clone();
            turns.push(ChatTurn::user(vec![Part::text(build_refine_prompt(
                instruction,
            ))]));
            turns
        };

        let inner = self.model.stream_chat(turns.clone()).await?;

        debug!("Refining active session ({} turns)", turns.len());
        *self.context.lock().expect("session context poisoned") = Some(turns);
        Ok(self.track_reply(inner))
    }

    /// Re-primes the context from a history snapshot: the rebuilt original
    /// prompt as the user turn and the stored ticket, serialized back to
    /// JSON, as the model turn. Any existing context is replaced.
    pub fn load_from_snapshot(&self, item: &HistoryItem) {
        let prompt = build_prompt(&item.requirement, item.ticket_type);
        let mut parts = vec![Part::text(prompt)];
        if item.ticket_type == TicketType::Bug {
            if let (Some(base64), Some(mime_type)) = (&item.image_base64, &item.image_mime_type) {
                let attachment = ImageAttachment {
                    base64: base64.clone(),
                    mime_type: mime_type.clone(),
                };
                if let Some(part) = image_part(&attachment) {
                    parts.push(part);
                }
            }
        }

        let reply = serde_json::to_string_pretty(&item.ticket)
            .expect("ticket serialization is infallible");

        debug!("Restored session context from history item {}", item.id);
        *self.context.lock().expect("session context poisoned") =
            Some(vec![ChatTurn::user(parts), ChatTurn::model_text(reply)]);
    }

    /// Wraps a model stream so the accumulated reply is recorded as a model
    /// turn once the stream ends successfully.
    fn track_reply(&self, inner: TextStream) -> TextStream {
        let context = Arc::clone(&self.context);
        Box::pin(async_stream::stream! {
            use futures::StreamExt;
            let mut inner = inner;
            let mut accumulated = String::new();

            while let Some(item) = inner.next().await {
                match item {
                    Ok(fragment) => {
                        accumulated.push_str(&fragment);
                        yield Ok(fragment);
                    }
                    Err(err) => {
                        yield Err(err);
                        return;
                    }
                }
            }

            if let Some(turns) = context.lock().expect("session context poisoned").as_mut() {
                turns.push(ChatTurn::model_text(accumulated));
            }
        })
    }
}

fn image_part(image: &ImageAttachment) -> Option<Part> {
    let data = strip_data_url_header(&image.base64);
    if data.is_empty() {
        return None;
    }
    let mime_type = if image.mime_type.is_empty() {
        "application/octet-stream"
    } else {
        image.mime_type.as_str()
    };
    Some(Part::inline_data(mime_type, data))
}

/// Returns the payload portion of a `data:` URL, or the input unchanged
/// when no header is present.
fn strip_data_url_header(value: &str) -> &str {
    if value.starts_with("data:") {
        value.split_once(',').map(|(_, rest)| rest).unwrap_or("")
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::ChatRole;
    use async_trait::async_trait;
    use futures::StreamExt;
    use ticketsmith_core::{extract_ticket, Priority, Ticket, TaskTicket};

    /// Scripted model: records every turn list it is called with and replays
    /// a fixed fragment sequence.
    struct ScriptedModel {
        fragments: Vec<&'static str>,
        calls: Arc<Mutex<Vec<Vec<ChatTurn>>>>,
    }

    impl ScriptedModel {
        fn new(fragments: Vec<&'static str>) -> Self {
            Self {
                fragments,
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn call(&self, index: usize) -> Vec<ChatTurn> {
            self.calls.lock().unwrap()[index].clone()
        }
    }

    #[async_trait]
    impl ChatModel for ScriptedModel {
        async fn stream_chat(&self, turns: Vec<ChatTurn>) -> Result<TextStream> {
            self.calls.lock().unwrap().push(turns);
            let fragments: Vec<Result<String>> = self
                .fragments
                .iter()
                .map(|f| Ok(f.to_string()))
                .collect();
            Ok(Box::pin(futures::stream::iter(fragments)))
        }
    }

    async fn accumulate(mut stream: TextStream) -> String {
        let mut full = String::new();
        while let Some(fragment) = stream.next().await {
            full.push_str(&fragment.unwrap());
        }
        full
    }

    fn sample_history_item() -> HistoryItem {
        HistoryItem::new(
            "Add an index",
            TicketType::Task,
            Ticket::Task(TaskTicket {
                title: "Add DB index".to_string(),
                description: String::new(),
                subtasks: Vec::new(),
            }),
            None,
            None,
        )
    }

    #[test]
    fn refine_on_a_fresh_session_fails_without_contacting_the_model() {
        let model = ScriptedModel::new(vec![]);
        let calls = Arc::clone(&model.calls);
        let session = TicketSession::new(model);

        let err = futures::executor::block_on(session.refine("shorter title")).err().unwrap();
        assert!(matches!(err, GenerationError::NoActiveSession));
        assert!(calls.lock().unwrap().is_empty());
        assert!(!session.is_active());
    }

    #[tokio::test]
    async fn start_new_streams_and_extracts_the_happy_path() {
        let model = ScriptedModel::new(vec![
            "{\"title\":\"L",
            "ogin fails on mobile\",\"description\":\"...\",\"stepsToReproduce\":[],\
             \"expectedBehavior\":\"\",\"actualBehavior\":\"\",\"priority\":\"High\"}",
        ]);
        let session = TicketSession::new(model);

        let stream = session
            .start_new("Login fails on mobile", TicketType::Bug, None)
            .await
            .unwrap();
        let full = accumulate(stream).await;

        let ticket = extract_ticket(&full, TicketType::Bug).unwrap();
        assert_eq!(ticket.title(), "Login fails on mobile");
        match &ticket {
            Ticket::Bug(bug) => assert_eq!(bug.priority, Some(Priority::High)),
            other => panic!("expected a bug, got {:?}", other),
        }
        assert!(session.is_active());

        // The completed result lands at the front of the history collection.
        let item = HistoryItem::new("Login fails on mobile", TicketType::Bug, ticket, None, None);
        let items = ticketsmith_core::insert_or_replace(&[], item);
        assert_eq!(items[0].ticket.title(), "Login fails on mobile");
    }

    #[tokio::test]
    async fn prompt_sent_to_the_model_names_the_type_and_requirement() {
        let model = ScriptedModel::new(vec!["{}"]);
        let calls = Arc::clone(&model.calls);
        let session = TicketSession::new(model);

        let stream = session
            .start_new("Login fails on mobile", TicketType::Bug, None)
            .await
            .unwrap();
        accumulate(stream).await;

        let calls = calls.lock().unwrap();
        let prompt = calls[0][0].text();
        assert!(prompt.contains("Login fails on mobile"));
        assert!(prompt.contains("\"Bug\""));
    }

    #[tokio::test]
    async fn successful_stream_appends_the_model_reply_for_refinement() {
        let model = ScriptedModel::new(vec!["{\"title\":\"Indexed\"}"]);
        let session = TicketSession::new(model);

        let stream = session
            .start_new("Add an index", TicketType::Task, None)
            .await
            .unwrap();
        accumulate(stream).await;

        let stream = session.refine("mention the table name").await.unwrap();
        accumulate(stream).await;

        // Second call carries: original user turn, recorded model reply,
        // refinement instruction.
        let second_call = session.model.call(1);
        assert_eq!(second_call.len(), 3);
        assert_eq!(second_call[0].role, ChatRole::User);
        assert_eq!(second_call[1].role, ChatRole::Model);
        assert_eq!(second_call[1].text(), "{\"title\":\"Indexed\"}");
        assert!(second_call[2].text().contains("mention the table name"));
    }

    #[tokio::test]
    async fn start_new_replaces_the_previous_context() {
        let model = ScriptedModel::new(vec!["{\"title\":\"x\"}"]);
        let session = TicketSession::new(model);

        let stream = session
            .start_new("first requirement", TicketType::Story, None)
            .await
            .unwrap();
        accumulate(stream).await;

        let stream = session
            .start_new("second requirement", TicketType::Story, None)
            .await
            .unwrap();
        accumulate(stream).await;

        let second_call = session.model.call(1);
        assert_eq!(second_call.len(), 1);
        assert!(second_call[0].text().contains("second requirement"));
        assert!(!second_call[0].text().contains("first requirement"));
    }

    #[tokio::test]
    async fn image_is_attached_only_for_bugs_with_a_payload() {
        let image = ImageAttachment {
            base64: "data:image/png;base64,aWJi".to_string(),
            mime_type: "image/png".to_string(),
        };

        let model = ScriptedModel::new(vec!["{}"]);
        let session = TicketSession::new(model);
        let stream = session
            .start_new("broken layout", TicketType::Bug, Some(&image))
            .await
            .unwrap();
        accumulate(stream).await;
        assert_eq!(session.model.call(0)[0].parts.len(), 2);

        // Same image on a non-Bug type is ignored.
        let model = ScriptedModel::new(vec!["{}"]);
        let session = TicketSession::new(model);
        let stream = session
            .start_new("broken layout", TicketType::Story, Some(&image))
            .await
            .unwrap();
        accumulate(stream).await;
        assert_eq!(session.model.call(0)[0].parts.len(), 1);

        // A data URL with an empty payload is dropped.
        let empty = ImageAttachment {
            base64: "data:image/png;base64".to_string(),
            mime_type: "image/png".to_string(),
        };
        let model = ScriptedModel::new(vec!["{}"]);
        let session = TicketSession::new(model);
        let stream = session
            .start_new("broken layout", TicketType::Bug, Some(&empty))
            .await
            .unwrap();
        accumulate(stream).await;
        assert_eq!(session.model.call(0)[0].parts.len(), 1);
    }

    #[tokio::test]
    async fn load_from_snapshot_primes_user_and_model_turns() {
        let item = sample_history_item();
        let model = ScriptedModel::new(vec!["{\"title\":\"Add DB index (users)\"}"]);
        let session = TicketSession::new(model);

        session.load_from_snapshot(&item);
        assert!(session.is_active());

        let stream = session.refine("name the table").await.unwrap();
        accumulate(stream).await;

        let call = session.model.call(0);
        assert_eq!(call.len(), 3);
        assert!(call[0].text().contains("Add an index"));
        assert_eq!(call[1].role, ChatRole::Model);
        assert!(call[1].text().contains("\"title\": \"Add DB index\""));
        assert!(call[2].text().contains("name the table"));
    }

    #[test]
    fn data_url_header_stripping() {
        assert_eq!(strip_data_url_header("data:image/png;base64,abc"), "abc");
        assert_eq!(strip_data_url_header("plainbase64"), "plainbase64");
        assert_eq!(strip_data_url_header("data:image/png;base64"), "");
    }
}
