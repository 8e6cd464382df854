//! Request and response shapes shared by every surface

use crate::model::{ApplicationDefinition, Passthrough, StyleFramework};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

fn default_framework() -> String {
    "react".to_string()
}

/// Inbound generation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Natural-language description of the project
    pub prompt: String,
    /// Framework tag
    #[serde(default = "default_framework")]
    pub framework: String,
    /// Styling framework
    #[serde(default)]
    pub style_framework: StyleFramework,
    /// Extra free-form requirements
    #[serde(default)]
    pub additional_requirements: Vec<String>,
}

impl GenerationRequest {
    /// Create request with defaults
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            framework: default_framework(),
            style_framework: StyleFramework::default(),
            additional_requirements: Vec::new(),
        }
    }

    /// With framework tag
    #[must_use]
    pub fn with_framework(mut self, framework: impl Into<String>) -> Self {
        self.framework = framework.into();
        self
    }

    /// With styling framework
    #[must_use]
    pub fn with_style(mut self, style: StyleFramework) -> Self {
        self.style_framework = style;
        self
    }

    /// With an extra requirement
    #[must_use]
    pub fn with_requirement(mut self, requirement: impl Into<String>) -> Self {
        self.additional_requirements.push(requirement.into());
        self
    }

    /// Whether the prompt carries any text
    #[must_use]
    pub fn has_prompt(&self) -> bool {
        !self.prompt.trim().is_empty()
    }
}

/// Ordered path→content mapping
pub type FileMap = IndexMap<String, String>;

/// Non-streaming generation result
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// True when a definition was produced and every file synthesized
    pub success: bool,
    /// The enriched definition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ado: Option<ApplicationDefinition>,
    /// Synthesized file contents
    #[serde(default)]
    pub files: FileMap,
    /// Hard errors (per-file failures, invalid request)
    #[serde(default)]
    pub errors: Vec<String>,
    /// Validator issues
    #[serde(default)]
    pub warnings: Vec<String>,
    /// Pipeline metadata (strategy, attempts, cache hit)
    #[serde(default)]
    pub generation_metadata: Passthrough,
}

impl GenerationResponse {
    /// Failed response carrying a single error
    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            errors: vec![error.into()],
            ..Self::default()
        }
    }
}
