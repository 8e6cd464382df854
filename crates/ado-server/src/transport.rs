//! HTTP and WebSocket surface
//!
//! Routes:
//! - `GET  /health`
//! - `POST /generate`      non-streaming generation
//! - `WS   /ws/generate`   one generation session per connection
//! - `WS   /ws/chat`       long-lived chat session

use crate::chat::ChatSession;
use crate::error::SessionError;
use crate::session::{GenerationSession, StreamingConfig};
use crate::sink::{parse_inbound, EventSink, Inbound, MessageSource};
use ado_schema::GenerationRequest;
use ado_synth::Pipeline;
use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use std::convert::Infallible;
use std::sync::Arc;
use tracing::Instrument;
use warp::http::StatusCode;
use warp::ws::{Message, WebSocket, Ws};
use warp::Filter;

const MAX_BODY_BYTES: u64 = 1024 * 1024;

/// State shared by every handler
#[derive(Debug, Clone)]
pub struct AppState {
    /// Synthesis machinery
    pub pipeline: Arc<Pipeline>,
    /// Content pacing
    pub streaming: StreamingConfig,
}

impl AppState {
    /// Create state
    #[must_use]
    pub fn new(pipeline: Pipeline, streaming: StreamingConfig) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            streaming,
        }
    }
}

/// Outbound half of a WebSocket
pub struct WsSink(SplitSink<WebSocket, Message>);

#[async_trait]
impl EventSink for WsSink {
    async fn send(&mut self, message: Value) -> Result<(), SessionError> {
        self.0
            .send(Message::text(message.to_string()))
            .await
            .map_err(|_| SessionError::Disconnected)
    }

    async fn close(&mut self) {
        if let Err(e) = self.0.close().await {
            tracing::debug!(error = %e, "websocket close failed");
        }
    }
}

/// Inbound half of a WebSocket
pub struct WsSource(SplitStream<WebSocket>);

#[async_trait]
impl MessageSource for WsSource {
    async fn recv(&mut self) -> Inbound {
        while let Some(frame) = self.0.next().await {
            let Ok(message) = frame else {
                return Inbound::Closed;
            };
            if message.is_close() {
                return Inbound::Closed;
            }
            if let Ok(text) = message.to_str() {
                return parse_inbound(text);
            }
        }
        Inbound::Closed
    }
}

fn with_state(
    state: AppState,
) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

/// All routes
pub fn routes(
    state: AppState,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .map(|| warp::reply::json(&json!({"status": "ok", "version": crate::VERSION})));

    let generate = warp::path("generate")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json())
        .and(with_state(state.clone()))
        .and_then(generate_handler);

    let ws_generate = warp::path!("ws" / "generate")
        .and(warp::ws())
        .and(with_state(state.clone()))
        .map(|ws: Ws, state: AppState| {
            ws.on_upgrade(move |socket| generation_socket(socket, state))
        });

    let ws_chat = warp::path!("ws" / "chat")
        .and(warp::ws())
        .and(with_state(state))
        .map(|ws: Ws, state: AppState| ws.on_upgrade(move |socket| chat_socket(socket, state)));

    health.or(generate).or(ws_generate).or(ws_chat)
}

async fn generate_handler(
    request: GenerationRequest,
    state: AppState,
) -> Result<impl warp::Reply, Infallible> {
    let response = state.pipeline.generate_project(&request).await;
    let status = if response.ado.is_none() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::OK
    };
    Ok(warp::reply::with_status(warp::reply::json(&response), status))
}

async fn generation_socket(socket: WebSocket, state: AppState) {
    let span = tracing::info_span!("generation", session = %uuid::Uuid::new_v4());
    async move {
        let (tx, rx) = socket.split();
        let mut source = WsSource(rx);
        let mut sink = WsSink(tx);

        let message = match source.recv().await {
            Inbound::Message(message) => message,
            Inbound::Malformed(e) => {
                tracing::debug!(error = %e, "malformed generation request");
                Value::Null
            }
            Inbound::Closed => {
                sink.close().await;
                return;
            }
        };

        let session = GenerationSession::new(&state.pipeline, sink, state.streaming);
        let (end, _) = session.run(message).await;
        tracing::info!(state = ?end, "generation session closed");
    }
    .instrument(span)
    .await;
}

async fn chat_socket(socket: WebSocket, state: AppState) {
    let span = tracing::info_span!("chat", session = %uuid::Uuid::new_v4());
    async move {
        let (tx, rx) = socket.split();
        let session = ChatSession::new(&state.pipeline, WsSink(tx), WsSource(rx));
        let (handled, _) = session.run().await;
        tracing::info!(handled, "chat session closed");
    }
    .instrument(span)
    .await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use ado_synth::{Oracle, OracleError, RequestStore, RetryPolicy, StoreConfig};

    struct Prose;

    #[async_trait]
    impl Oracle for Prose {
        async fn generate(&self, _prompt: &str) -> Result<String, OracleError> {
            Ok("I would rather write a poem.".to_string())
        }
    }

    fn state() -> AppState {
        let pipeline = Pipeline::new(
            Arc::new(Prose),
            RetryPolicy::immediate(1),
            Arc::new(RequestStore::new(StoreConfig::unthrottled())),
        );
        AppState::new(pipeline, StreamingConfig::instant())
    }

    #[tokio::test]
    async fn health() {
        let response = warp::test::request()
            .method("GET")
            .path("/health")
            .reply(&routes(state()))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn generate_falls_back_on_prose() {
        let response = warp::test::request()
            .method("POST")
            .path("/generate")
            .json(&json!({"prompt": "simple todo app"}))
            .reply(&routes(state()))
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["ado"]["name"], "fallback-app");
        assert_eq!(body["generation_metadata"]["strategy"], "fallback");
        assert_eq!(body["files"]["src/App.jsx"], "I would rather write a poem.");
    }

    #[tokio::test]
    async fn generate_rejects_blank_prompt() {
        let response = warp::test::request()
            .method("POST")
            .path("/generate")
            .json(&json!({"prompt": ""}))
            .reply(&routes(state()))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn chat_socket_validates() {
        let mut client = warp::test::ws()
            .path("/ws/chat")
            .handshake(routes(state()))
            .await
            .unwrap();

        client
            .send_text(json!({"type": "validate_ado", "ado": {"name": "x"}}).to_string())
            .await;
        let reply = client.recv().await.unwrap();
        let body: Value = serde_json::from_str(reply.to_str().unwrap()).unwrap();

        assert_eq!(body["type"], "validation_result");
        assert_eq!(body["valid"], false);
    }
}
