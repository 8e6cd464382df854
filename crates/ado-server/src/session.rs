//! Generation session
//!
//! One session per generation request. The session is an explicit state
//! machine driving a single injected [`EventSink`]:
//!
//! ```text
//! Awaiting ─▶ Synthesizing ─▶ Streaming{i,n} ─▶ Finished
//!     │             │                │
//!     └─────────────┴────────────────┴──▶ Failed / Disconnected
//! ```
//!
//! Whatever state the flow ends in, the channel is closed exactly once.

use crate::error::SessionError;
use crate::events::GenerationEvent;
use crate::sink::{send_event, EventSink};
use ado_schema::{ApplicationDefinition, FileSlot, GenerationRequest};
use ado_synth::{Pipeline, Plan};
use serde_json::Value;
use std::time::Duration;

/// Pacing of content delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamingConfig {
    /// Characters per `code_chunk` event
    pub chunk_size: usize,
    /// Pause after each chunk
    pub chunk_delay: Duration,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 100,
            chunk_delay: Duration::from_millis(50),
        }
    }
}

impl StreamingConfig {
    /// Configuration without pauses
    #[must_use]
    pub fn instant() -> Self {
        Self {
            chunk_delay: Duration::ZERO,
            ..Self::default()
        }
    }

    /// With chunk size (at least one character)
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }
}

/// Split `content` into slices of at most `size` characters
pub fn chunks(content: &str, size: usize) -> impl Iterator<Item = &str> {
    let size = size.max(1);
    let mut rest = content;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let end = rest
            .char_indices()
            .nth(size)
            .map_or(rest.len(), |(idx, _)| idx);
        let (head, tail) = rest.split_at(end);
        rest = tail;
        Some(head)
    })
}

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for the request
    Awaiting,
    /// Definition synthesis in progress
    Synthesizing,
    /// Streaming file `index` of `total`
    Streaming {
        /// Zero-based file index
        index: usize,
        /// Number of files
        total: usize,
    },
    /// All events delivered
    Finished,
    /// Ended with an error event
    Failed,
    /// Client went away
    Disconnected,
}

impl SessionState {
    /// Whether the flow has ended
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Failed | Self::Disconnected)
    }
}

/// One generation exchange over a channel
pub struct GenerationSession<'a, S: EventSink> {
    pipeline: &'a Pipeline,
    sink: S,
    config: StreamingConfig,
    state: SessionState,
}

impl<'a, S: EventSink> GenerationSession<'a, S> {
    /// Create session
    pub fn new(pipeline: &'a Pipeline, sink: S, config: StreamingConfig) -> Self {
        Self {
            pipeline,
            sink,
            config,
            state: SessionState::Awaiting,
        }
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Run the flow for an inbound request message and close the channel
    ///
    /// Returns the terminal state together with the sink.
    pub async fn run(mut self, message: Value) -> (SessionState, S) {
        match self.drive(message).await {
            Ok(()) => {}
            Err(SessionError::Disconnected) => {
                tracing::info!(state = ?self.state, "client disconnected during generation");
                self.state = SessionState::Disconnected;
            }
            Err(e) => {
                tracing::error!(error = %e, "generation session failed");
                self.state = SessionState::Failed;
                let event = GenerationEvent::error(format!("Generation error: {e}"));
                if let Err(send_err) = send_event(&mut self.sink, &event).await {
                    tracing::debug!(error = %send_err, "could not report session failure");
                }
            }
        }

        self.sink.close().await;
        (self.state, self.sink)
    }

    async fn emit(&mut self, event: GenerationEvent) -> Result<(), SessionError> {
        tracing::trace!(event = event.tag(), "emit");
        send_event(&mut self.sink, &event).await
    }

    async fn fail(&mut self, message: String) -> Result<(), SessionError> {
        self.state = SessionState::Failed;
        self.emit(GenerationEvent::error(message)).await
    }

    async fn drive(&mut self, message: Value) -> Result<(), SessionError> {
        let has_prompt = message
            .get("prompt")
            .and_then(Value::as_str)
            .is_some_and(|p| !p.trim().is_empty());
        if !has_prompt {
            return self.fail("Prompt is required.".to_string()).await;
        }

        let request: GenerationRequest = match serde_json::from_value(message) {
            Ok(request) => request,
            Err(e) => return self.fail(format!("Generation error: invalid request: {e}")).await,
        };

        self.state = SessionState::Synthesizing;
        tracing::info!(prompt_len = request.prompt.len(), framework = %request.framework, "generation started");
        self.emit(GenerationEvent::status(
            "Analyzing requirements and creating application structure...",
        ))
        .await?;

        let pipeline = self.pipeline;
        let plan = match pipeline.plan(&request).await {
            Ok(plan) => plan,
            Err(e) => {
                return self
                    .fail(format!("Failed to generate application structure: {e}"))
                    .await
            }
        };

        self.deliver(plan).await
    }

    async fn deliver(&mut self, plan: Plan) -> Result<(), SessionError> {
        let Plan {
            definition: ado,
            issues,
            ..
        } = plan;

        if !issues.is_empty() {
            self.emit(GenerationEvent::Warning {
                message: format!("ADO validation issues: {}", issues.join(", ")),
            })
            .await?;
        }

        let total = ado.files.len();
        self.emit(GenerationEvent::AdoGenerated {
            message: format!("Created application definition with {total} files"),
            ado: Box::new(ado.clone()),
        })
        .await?;
        self.emit(GenerationEvent::StructureGenerated {
            files: ado.file_paths(),
        })
        .await?;
        self.emit(GenerationEvent::status("Generating code files...")).await?;

        for (index, slot) in ado.files.iter().enumerate() {
            self.state = SessionState::Streaming { index, total };
            self.stream_file(slot, &ado, index, total).await?;
        }

        self.emit(GenerationEvent::Finish {
            message: "Application generated successfully!".to_string(),
            ado: Box::new(ado),
        })
        .await?;
        self.state = SessionState::Finished;
        tracing::info!(files = total, "generation finished");
        Ok(())
    }

    async fn stream_file(
        &mut self,
        slot: &FileSlot,
        ado: &ApplicationDefinition,
        index: usize,
        total: usize,
    ) -> Result<(), SessionError> {
        self.emit(GenerationEvent::FileStart {
            path: slot.path.clone(),
            description: slot.description.clone(),
        })
        .await?;

        let pipeline = self.pipeline;
        let error = match pipeline.files().synthesize_file(slot, ado).await {
            Ok(content) => {
                for chunk in chunks(&content, self.config.chunk_size) {
                    self.emit(GenerationEvent::CodeChunk {
                        path: slot.path.clone(),
                        chunk: chunk.to_string(),
                    })
                    .await?;
                    if !self.config.chunk_delay.is_zero() {
                        tokio::time::sleep(self.config.chunk_delay).await;
                    }
                }
                None
            }
            Err(e) => {
                tracing::warn!(path = %slot.path, error = %e, "file synthesis failed");
                Some(format!("Failed to generate content: {}", e.describe()))
            }
        };

        self.emit(GenerationEvent::FileEnd {
            path: slot.path.clone(),
            progress: progress(index + 1, total),
            error,
        })
        .await
    }
}

#[allow(clippy::cast_precision_loss)]
fn progress(done: usize, total: usize) -> f64 {
    if total == 0 {
        return 100.0;
    }
    done as f64 / total as f64 * 100.0
}
