//! Testing utilities for ADO workspace
//!
//! Scripted oracle, recording sink, scripted message source and fixtures.

#![allow(missing_docs)]

use ado_schema::{ApplicationDefinition, ComponentSpec, Dependency, FileSlot};
use ado_server::{EventSink, Inbound, MessageSource, SessionError, StreamingConfig};
use ado_synth::{Oracle, OracleError, Pipeline, RequestStore, RetryPolicy, StoreConfig};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Arc;

/// Oracle that replays scripted replies and records every prompt
#[derive(Debug, Default)]
pub struct ScriptedOracle {
    replies: Mutex<VecDeque<Result<String, OracleError>>>,
    otherwise: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedOracle {
    pub fn new(replies: impl IntoIterator<Item = Result<String, OracleError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn texts<S: Into<String>>(replies: impl IntoIterator<Item = S>) -> Self {
        Self::new(replies.into_iter().map(|r| Ok(r.into())))
    }

    /// Always answer with the same text
    pub fn always(reply: impl Into<String>) -> Self {
        Self {
            otherwise: Some(reply.into()),
            ..Self::default()
        }
    }

    /// Text used once the script runs out
    #[must_use]
    pub fn otherwise(mut self, reply: impl Into<String>) -> Self {
        self.otherwise = Some(reply.into());
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().len()
    }
}

#[async_trait]
impl Oracle for ScriptedOracle {
    async fn generate(&self, prompt: &str) -> Result<String, OracleError> {
        self.prompts.lock().push(prompt.to_string());
        if let Some(reply) = self.replies.lock().pop_front() {
            return reply;
        }
        self.otherwise
            .clone()
            .ok_or_else(|| OracleError::transport("script exhausted"))
    }
}

/// Pipeline around `oracle` without pacing or backoff
pub fn pipeline(oracle: Arc<ScriptedOracle>) -> Pipeline {
    pipeline_with_retry(oracle, RetryPolicy::immediate(1))
}

pub fn pipeline_with_retry(oracle: Arc<ScriptedOracle>, retry: RetryPolicy) -> Pipeline {
    Pipeline::new(
        oracle,
        retry,
        Arc::new(RequestStore::new(StoreConfig::unthrottled())),
    )
}

/// Streaming without pauses and with a small chunk size
pub fn fast_streaming() -> StreamingConfig {
    StreamingConfig::instant().with_chunk_size(16)
}

/// Sink that records every message
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<Value>,
    pub closed: usize,
    disconnect_after: Option<usize>,
    pub rejected: usize,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report a disconnect once `n` messages were delivered
    pub fn disconnect_after(n: usize) -> Self {
        Self {
            disconnect_after: Some(n),
            ..Self::default()
        }
    }

    /// Value of `tag_key` for each recorded event
    pub fn tags(&self, tag_key: &str) -> Vec<String> {
        self.events
            .iter()
            .map(|e| e[tag_key].as_str().unwrap_or_default().to_string())
            .collect()
    }

    /// Events whose `tag_key` equals `tag`
    pub fn with_tag(&self, tag_key: &str, tag: &str) -> Vec<&Value> {
        self.events.iter().filter(|e| e[tag_key] == tag).collect()
    }
}

#[async_trait]
impl EventSink for RecordingSink {
    async fn send(&mut self, message: Value) -> Result<(), SessionError> {
        if self.disconnect_after.is_some_and(|n| self.events.len() >= n) {
            self.rejected += 1;
            return Err(SessionError::Disconnected);
        }
        self.events.push(message);
        Ok(())
    }

    async fn close(&mut self) {
        self.closed += 1;
    }
}

/// Source that replays scripted inbound messages, then reports close
#[derive(Debug, Default)]
pub struct ScriptedSource {
    messages: VecDeque<Inbound>,
}

impl ScriptedSource {
    pub fn new(messages: impl IntoIterator<Item = Value>) -> Self {
        Self {
            messages: messages.into_iter().map(Inbound::Message).collect(),
        }
    }

    #[must_use]
    pub fn then(mut self, inbound: Inbound) -> Self {
        self.messages.push_back(inbound);
        self
    }
}

#[async_trait]
impl MessageSource for ScriptedSource {
    async fn recv(&mut self) -> Inbound {
        self.messages.pop_front().unwrap_or(Inbound::Closed)
    }
}

/// Definition JSON with three pending file slots, as an oracle would send it
pub fn three_file_reply() -> String {
    json!({
        "name": "todo-app",
        "description": "A simple todo app",
        "framework": "react",
        "files": [
            {"path": "package.json", "type": "json", "content": "", "description": "Package configuration"},
            {"path": "src/App.jsx", "type": "jsx", "content": "", "description": "Main component", "component": "App"},
            {"path": "src/index.css", "type": "css", "content": "", "description": "Styles"}
        ],
        "components": [
            {"name": "App", "type": "functional", "file_path": "src/App.jsx",
             "props": [], "imports": ["react"], "exports": ["default"]}
        ],
        "dependencies": [
            {"name": "react", "version": "^18.2.0", "dev": false},
            {"name": "react-dom", "version": "^18.2.0", "dev": false}
        ],
        "style_config": {"framework": "tailwindcss", "theme": {}, "custom_css": null}
    })
    .to_string()
}

/// Valid React definition with a manifest and one component
pub fn sample_definition() -> ApplicationDefinition {
    ApplicationDefinition::new("todo-app")
        .with_file(FileSlot::new("package.json").with_description("Package configuration"))
        .with_file(
            FileSlot::new("src/App.jsx")
                .with_description("Main component")
                .with_component("App"),
        )
        .with_component(ComponentSpec::new("App", "src/App.jsx"))
        .with_dependency(Dependency::runtime("react", "^18.2.0"))
        .with_dependency(Dependency::runtime("react-dom", "^18.2.0"))
}

/// React definition whose only defect is the missing manifest
pub fn definition_without_manifest() -> Value {
    json!({
        "name": "no-manifest",
        "framework": "react",
        "files": [{"path": "src/App.jsx", "type": "jsx", "content": ""}],
        "components": [{"name": "App", "type": "functional", "file_path": "src/App.jsx"}],
        "dependencies": [
            {"name": "react", "version": "^18.2.0"},
            {"name": "react-dom", "version": "^18.2.0"}
        ]
    })
}
