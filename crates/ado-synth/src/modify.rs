//! Modification of an existing definition
//!
//! A single oracle call (with the client's transport retries) and a single
//! decode. There is no ladder and no fallback: a failed change request is
//! reported, it never replaces the caller's project with a skeleton.

use crate::decode::decode_value;
use crate::error::{ModifyError, SynthError};
use crate::extract::extract_value;
use crate::oracle::OracleClient;
use crate::prompts::PromptBuilder;
use ado_schema::ApplicationDefinition;
use serde_json::Value;

/// Natural-language change request against a definition
#[derive(Debug, Clone, PartialEq)]
pub struct ModificationRequest {
    /// What to change
    pub instruction: String,
    /// Definition to change
    pub current: ApplicationDefinition,
    /// Paths the change should focus on; empty means auto-detect
    pub target_paths: Vec<String>,
    /// Keep unrelated structure intact
    pub preserve_structure: bool,
}

impl ModificationRequest {
    /// Create request that preserves structure and auto-detects targets
    #[must_use]
    pub fn new(instruction: impl Into<String>, current: ApplicationDefinition) -> Self {
        Self {
            instruction: instruction.into(),
            current,
            target_paths: Vec::new(),
            preserve_structure: true,
        }
    }

    /// With explicit target paths
    #[must_use]
    pub fn with_targets(mut self, paths: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.target_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    /// With structure preservation switched on or off
    #[must_use]
    pub fn with_preserve_structure(mut self, preserve: bool) -> Self {
        self.preserve_structure = preserve;
        self
    }
}

/// Applies change requests through the oracle
#[derive(Debug, Clone)]
pub struct Modifier {
    client: OracleClient,
}

impl Modifier {
    /// Create modifier
    #[must_use]
    pub fn new(client: OracleClient) -> Self {
        Self { client }
    }

    /// Produce a new definition with the requested change applied
    ///
    /// # Errors
    /// - [`ModifyError::EmptyInstruction`] for a blank instruction
    /// - [`ModifyError::Synthesis`] when the oracle fails or its reply does
    ///   not decode
    pub async fn modify(
        &self,
        request: &ModificationRequest,
    ) -> Result<ApplicationDefinition, ModifyError> {
        if request.instruction.trim().is_empty() {
            return Err(ModifyError::EmptyInstruction);
        }

        let current = serde_json::to_string_pretty(&request.current)?;
        let prompt = PromptBuilder::modification(
            &current,
            &request.instruction,
            &request.target_paths,
            request.preserve_structure,
        );

        let reply = self.client.call(&prompt).await.map_err(SynthError::from)?;
        let mut value = extract_value(&reply).map_err(SynthError::from)?;
        keep_name(&mut value, &request.current.name);
        let modified = decode_value(value)?;

        tracing::info!(
            name = %modified.name,
            files_before = request.current.files.len(),
            files_after = modified.files.len(),
            "definition modified"
        );
        Ok(modified)
    }
}

/// A revision that drops `name` keeps the project's current one
fn keep_name(value: &mut Value, name: &str) {
    if let Some(obj) = value.as_object_mut() {
        if obj.get("name").map_or(true, Value::is_null) {
            obj.insert("name".to_string(), Value::String(name.to_string()));
        }
    }
}
