//! Chat session: repeated change and validation requests
//!
//! Every inbound message carries a `type` discriminator. Failures are
//! contained to the message that caused them; only a closed channel ends
//! the loop.

use crate::error::SessionError;
use crate::events::ChatEvent;
use crate::sink::{send_event, EventSink, Inbound, MessageSource};
use ado_schema::{ApplicationDefinition, FileMap};
use ado_synth::{ModificationRequest, Pipeline};
use serde_json::Value;

/// Inbound message kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    ChatMessage,
    ValidateAdo,
}

impl Kind {
    fn parse(tag: &str) -> Option<Self> {
        match tag {
            "chat_message" => Some(Self::ChatMessage),
            "validate_ado" => Some(Self::ValidateAdo),
            _ => None,
        }
    }
}

/// Long-lived conversational session
pub struct ChatSession<'a, S: EventSink, R: MessageSource> {
    pipeline: &'a Pipeline,
    sink: S,
    source: R,
    handled: usize,
}

impl<'a, S: EventSink, R: MessageSource> ChatSession<'a, S, R> {
    /// Create session
    pub fn new(pipeline: &'a Pipeline, sink: S, source: R) -> Self {
        Self {
            pipeline,
            sink,
            source,
            handled: 0,
        }
    }

    /// Serve messages until the client goes away, then close the channel
    ///
    /// Returns the number of messages handled together with the sink.
    pub async fn run(mut self) -> (usize, S) {
        loop {
            let outcome = match self.source.recv().await {
                Inbound::Closed => break,
                Inbound::Malformed(e) => {
                    self.reply(ChatEvent::error(format!("Invalid message: {e}"))).await
                }
                Inbound::Message(message) => self.handle(message).await,
            };
            self.handled += 1;

            match outcome {
                Ok(()) => {}
                Err(SessionError::Disconnected) => break,
                Err(e) => tracing::warn!(error = %e, "could not answer chat message"),
            }
        }

        tracing::info!(handled = self.handled, "chat session ended");
        self.sink.close().await;
        (self.handled, self.sink)
    }

    async fn reply(&mut self, event: ChatEvent) -> Result<(), SessionError> {
        send_event(&mut self.sink, &event).await
    }

    async fn handle(&mut self, message: Value) -> Result<(), SessionError> {
        let tag = message.get("type").and_then(Value::as_str);
        match tag.and_then(Kind::parse) {
            Some(Kind::ChatMessage) => self.chat(&message).await,
            Some(Kind::ValidateAdo) => self.validate(&message).await,
            None => {
                let text = match tag {
                    Some(t) => format!("Unknown message type: {t}"),
                    None => "Message type is required".to_string(),
                };
                self.reply(ChatEvent::error(text)).await
            }
        }
    }

    async fn chat(&mut self, message: &Value) -> Result<(), SessionError> {
        let instruction = match message.get("message").and_then(Value::as_str) {
            Some(text) if !text.trim().is_empty() => text.to_string(),
            _ => return self.reply(ChatEvent::error("Message is required")).await,
        };

        let current = match current_definition(message) {
            Ok(current) => current,
            Err(text) => return self.reply(ChatEvent::error(text)).await,
        };

        self.reply(ChatEvent::Status {
            message: "Understanding your request...".to_string(),
        })
        .await?;

        let pipeline = self.pipeline;
        let request = ModificationRequest::new(instruction.clone(), current);
        let event = match pipeline.revise(&request).await {
            Ok((updated, changes)) => ChatEvent::ChatResponse {
                response: format!(
                    "I've updated your application based on your request: '{instruction}'"
                ),
                changes,
                updated_ado: Box::new(updated),
            },
            Err(e) => {
                tracing::warn!(error = %e, "modification failed");
                ChatEvent::error(format!("Failed to process modification: {e}"))
            }
        };
        self.reply(event).await
    }

    async fn validate(&mut self, message: &Value) -> Result<(), SessionError> {
        let Some(payload) = message.get("ado").filter(|v| !v.is_null()) else {
            return self.reply(ChatEvent::error("ADO is required")).await;
        };

        let event = match serde_json::from_value::<ApplicationDefinition>(payload.clone()) {
            Ok(ado) => ChatEvent::validation(self.pipeline.validator().validate(&ado)),
            Err(e) => ChatEvent::validation(vec![format!("Invalid ADO structure: {e}")]),
        };
        self.reply(event).await
    }
}

/// Definition a change request applies to
///
/// An embedded `current_ado` wins; otherwise a skeleton is rebuilt from
/// `current_files`.
fn current_definition(message: &Value) -> Result<ApplicationDefinition, String> {
    if let Some(ado) = message.get("current_ado").filter(|v| !v.is_null()) {
        return serde_json::from_value(ado.clone())
            .map_err(|e| format!("Invalid ADO structure: {e}"));
    }

    match message.get("current_files").filter(|v| !v.is_null()) {
        Some(files) => {
            let files: FileMap = serde_json::from_value(files.clone())
                .map_err(|e| format!("Invalid current_files: {e}"))?;
            Ok(ApplicationDefinition::from_files(&files))
        }
        None => Err("Either current_ado or current_files is required".to_string()),
    }
}
