//! ADO Synth
//!
//! Coerces an unreliable text-generation oracle into schema-valid
//! application definitions and file contents.
//!
//! # Core Operations
//!
//! - **Extract**: locate a JSON object inside free-form replies
//! - **Repair**: normalize known deviations on the loose JSON tree
//! - **Synthesize**: `FullDirective → SimplifiedDirective → Fallback` ladder
//! - **Files**: expand each file slot into source text
//! - **Modify**: apply a change request to an existing definition
//!
//! # Example
//!
//! ```rust,ignore
//! use ado_synth::prelude::*;
//!
//! let store = Arc::new(RequestStore::default());
//! let pipeline = Pipeline::new(oracle, RetryPolicy::default(), store);
//!
//! let plan = pipeline.plan(&GenerationRequest::new("todo app")).await?;
//! let files = pipeline.files().synthesize_files(&plan.definition).await?;
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod decode;
pub mod error;
pub mod extract;
pub mod files;
pub mod gemini;
pub mod ladder;
pub mod modify;
pub mod oracle;
pub mod pipeline;
pub mod prompts;
pub mod repair;
pub mod store;

pub use decode::parse_definition;
pub use error::{ExtractionError, ModifyError, OracleError, SynthError};
pub use extract::{extract_json, extract_value};
pub use files::FileSynthesizer;
pub use gemini::{GeminiOracle, GeminiSettings};
pub use ladder::{fallback, Strategy, Synthesis, Synthesizer};
pub use modify::{ModificationRequest, Modifier};
pub use oracle::{Oracle, OracleClient, RetryPolicy};
pub use pipeline::{Pipeline, Plan};
pub use store::{RequestKey, RequestStore, StoreConfig};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving the pipeline
    pub use crate::error::{ModifyError, OracleError, SynthError};
    pub use crate::ladder::{Strategy, Synthesis};
    pub use crate::modify::ModificationRequest;
    pub use crate::oracle::{Oracle, RetryPolicy};
    pub use crate::pipeline::{Pipeline, Plan};
    pub use crate::store::{RequestStore, StoreConfig};
    pub use ado_schema::prelude::*;
    pub use std::sync::Arc;
}
