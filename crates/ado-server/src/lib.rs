//! ADO Server
//!
//! Streaming session protocol over WebSockets plus a non-streaming HTTP
//! endpoint, both driving the same [`Pipeline`].
//!
//! # Sessions
//!
//! - **Generation**: one request in, a typed event stream out, then close
//! - **Chat**: repeated change and validation requests on one connection
//!
//! Both flows only see an [`EventSink`] (and a [`MessageSource`] for chat),
//! so they run unchanged against a recording sink in tests.

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod chat;
pub mod config;
pub mod error;
pub mod events;
pub mod session;
pub mod sink;
pub mod transport;

pub use chat::ChatSession;
pub use config::ServerConfig;
pub use error::{ConfigError, SessionError};
pub use events::{ChatEvent, GenerationEvent};
pub use session::{chunks, GenerationSession, SessionState, StreamingConfig};
pub use sink::{send_event, EventSink, Inbound, MessageSource};
pub use transport::{routes, AppState};

use ado_schema::{GenerationRequest, GenerationResponse};
use ado_synth::{GeminiOracle, Pipeline, RequestStore};
use std::io::Write;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Install the global tracing subscriber
///
/// Honors `RUST_LOG`, defaulting to `info`. Logs go to stderr, leaving
/// stdout to command output.
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    let layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    let installed = if json {
        registry.with(layer.json()).try_init()
    } else {
        registry.with(layer).try_init()
    };
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

/// Build the Gemini-backed pipeline described by `config`
///
/// # Errors
/// [`ConfigError::MissingApiKey`] or [`ConfigError::Oracle`].
pub fn build_pipeline(config: &ServerConfig) -> Result<Pipeline, ConfigError> {
    let oracle = GeminiOracle::new(config.gemini_settings()?)?;
    let store = Arc::new(RequestStore::new(config.store_config()));
    Ok(Pipeline::new(Arc::new(oracle), config.retry_policy(), store)
        .with_max_attempts(config.synthesis.max_attempts))
}

/// Run one non-streaming generation and write the response as JSON
///
/// The output is the pretty-printed response followed by a newline and
/// nothing else.
///
/// # Errors
/// Fails only when writing to `out` fails.
pub async fn write_generation<W: Write>(
    pipeline: &Pipeline,
    request: &GenerationRequest,
    out: &mut W,
) -> anyhow::Result<GenerationResponse> {
    let response = pipeline.generate_project(request).await;
    serde_json::to_writer_pretty(&mut *out, &response)?;
    writeln!(out)?;
    out.flush()?;
    Ok(response)
}

/// Serve all routes until Ctrl-C
///
/// # Errors
/// Fails when the pipeline cannot be built or the address cannot be bound.
pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let pipeline = build_pipeline(&config)?;
    let state = AppState::new(pipeline, config.streaming_config());

    let (addr, server) = warp::serve(routes(state)).try_bind_with_graceful_shutdown(
        config.bind,
        async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "cannot listen for shutdown signal");
                std::future::pending::<()>().await;
            }
        },
    )?;

    tracing::info!(%addr, version = VERSION, "server listening");
    server.await;
    tracing::info!("server stopped");
    Ok(())
}

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for embedding the sessions
    pub use crate::chat::ChatSession;
    pub use crate::config::ServerConfig;
    pub use crate::error::SessionError;
    pub use crate::events::{ChatEvent, GenerationEvent};
    pub use crate::session::{GenerationSession, SessionState, StreamingConfig};
    pub use crate::sink::{EventSink, Inbound, MessageSource};
}
