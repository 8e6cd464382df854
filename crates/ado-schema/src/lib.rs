//! ADO Schema
//!
//! The Application Definition Object: a structured, machine-checkable
//! description of a software project that an oracle fills in and the
//! file synthesizer expands into concrete sources.
//!
//! # Core Operations
//!
//! - **Model**: strict serde types for files, components, dependencies, styling
//! - **Validate**: report violated cross-reference invariants as issue strings
//! - **Enrich**: append framework- and style-implied dependencies (idempotent)
//! - **Reverse**: rebuild a skeleton definition from raw file contents
//!
//! # Example
//!
//! ```rust,ignore
//! use ado_schema::prelude::*;
//!
//! let ado = ApplicationDefinition::new("todo")
//!     .with_file(FileSlot::new("package.json"))
//!     .with_file(FileSlot::new("src/App.jsx").with_component("App"))
//!     .with_component(ComponentSpec::new("App", "src/App.jsx"));
//!
//! let validator = AdoValidator::new();
//! let enriched = validator.enrich(ado);
//! assert!(validator.validate(&enriched).is_empty());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod model;
pub mod request;
mod reverse;
pub mod validate;

pub use model::{
    ApiEndpoint, ApplicationDefinition, ComponentKind, ComponentSpec, Dependency, FileSlot,
    FileType, Passthrough, PropSpec, RouteSpec, StateSpec, StyleConfig, StyleFramework,
    UnknownVariant, MANIFEST_PATH,
};
pub use request::{FileMap, GenerationRequest, GenerationResponse};
pub use validate::{framework_dependencies, style_dependencies, AdoValidator};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with definitions
    pub use crate::model::{
        ApplicationDefinition, ComponentKind, ComponentSpec, Dependency, FileSlot, FileType,
        StyleFramework,
    };
    pub use crate::request::{FileMap, GenerationRequest, GenerationResponse};
    pub use crate::validate::AdoValidator;
}
