//! Channel seams of a session
//!
//! Sessions talk to the client only through [`EventSink`] and
//! [`MessageSource`], so the flows can be driven by a recording sink and a
//! scripted source in tests and by a WebSocket in production.

use crate::error::SessionError;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

/// Outbound half of a session channel
#[async_trait]
pub trait EventSink: Send {
    /// Send one JSON message
    ///
    /// # Errors
    /// [`SessionError::Disconnected`] once the client is gone.
    async fn send(&mut self, message: Value) -> Result<(), SessionError>;

    /// Close the channel; failures are ignored
    async fn close(&mut self);
}

/// One inbound message
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// Parsed JSON message
    Message(Value),
    /// Text that is not JSON
    Malformed(String),
    /// The client closed the channel
    Closed,
}

/// Inbound half of a session channel
#[async_trait]
pub trait MessageSource: Send {
    /// Wait for the next message
    async fn recv(&mut self) -> Inbound;
}

/// Encode and send a typed event
///
/// # Errors
/// [`SessionError::Encode`] if the event does not serialize, otherwise
/// whatever the sink reports.
pub async fn send_event<S, E>(sink: &mut S, event: &E) -> Result<(), SessionError>
where
    S: EventSink + ?Sized,
    E: Serialize + Sync,
{
    let value = serde_json::to_value(event)?;
    sink.send(value).await
}

/// Parse raw text into an [`Inbound`]
#[must_use]
pub fn parse_inbound(text: &str) -> Inbound {
    match serde_json::from_str(text) {
        Ok(value) => Inbound::Message(value),
        Err(e) => Inbound::Malformed(e.to_string()),
    }
}
