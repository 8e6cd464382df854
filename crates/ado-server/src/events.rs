//! Outbound event shapes
//!
//! Generation events are tagged by an `event` field, chat events by a
//! `type` field. Clients match on those tags, so both spellings are part
//! of the wire format.

use ado_schema::{ApplicationDefinition, FileMap};
use serde::{Deserialize, Serialize};

/// Event of the one-shot generation flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GenerationEvent {
    /// Informational progress
    Status {
        /// Human-readable text
        message: String,
    },
    /// Non-fatal validator issues
    Warning {
        /// Joined issue list
        message: String,
    },
    /// Fatal failure; the session closes afterwards
    Error {
        /// Human-readable text
        message: String,
    },
    /// The enriched definition
    AdoGenerated {
        /// Definition
        ado: Box<ApplicationDefinition>,
        /// Summary including the file count
        message: String,
    },
    /// Ordered file paths, sent before any content
    StructureGenerated {
        /// Paths
        files: Vec<String>,
    },
    /// Content of a file is about to stream
    FileStart {
        /// File path
        path: String,
        /// File description
        description: Option<String>,
    },
    /// Slice of a file's content
    CodeChunk {
        /// File path
        path: String,
        /// Content slice
        chunk: String,
    },
    /// A file is done, successfully or not
    FileEnd {
        /// File path
        path: String,
        /// Cumulative progress in percent
        progress: f64,
        /// Synthesis failure for this file
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    /// Final event
    Finish {
        /// Human-readable text
        message: String,
        /// Definition, repeated for clients that patched earlier views
        ado: Box<ApplicationDefinition>,
    },
}

impl GenerationEvent {
    /// Status event
    #[must_use]
    pub fn status(message: impl Into<String>) -> Self {
        Self::Status {
            message: message.into(),
        }
    }

    /// Error event
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Wire tag of this event
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Status { .. } => "status",
            Self::Warning { .. } => "warning",
            Self::Error { .. } => "error",
            Self::AdoGenerated { .. } => "ado_generated",
            Self::StructureGenerated { .. } => "structure_generated",
            Self::FileStart { .. } => "file_start",
            Self::CodeChunk { .. } => "code_chunk",
            Self::FileEnd { .. } => "file_end",
            Self::Finish { .. } => "finish",
        }
    }
}

/// Event of the chat/modification flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// Informational progress
    Status {
        /// Human-readable text
        message: String,
    },
    /// Failure of one inbound message; the loop continues
    Error {
        /// Human-readable text
        message: String,
    },
    /// Result of a change request
    ChatResponse {
        /// Human-readable acknowledgement
        response: String,
        /// Synthesized files of the updated definition
        changes: FileMap,
        /// Updated definition
        updated_ado: Box<ApplicationDefinition>,
    },
    /// Result of a validation request
    ValidationResult {
        /// No issues found
        valid: bool,
        /// Issues
        issues: Vec<String>,
    },
}

impl ChatEvent {
    /// Error event
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Validation result from an issue list
    #[must_use]
    pub fn validation(issues: Vec<String>) -> Self {
        Self::ValidationResult {
            valid: issues.is_empty(),
            issues,
        }
    }
}
