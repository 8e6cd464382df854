//! File content synthesis
//!
//! Expands each file slot into source text with the definition as context.
//! Output is raw text: no JSON parsing happens here.

use crate::error::OracleError;
use crate::oracle::OracleClient;
use crate::prompts::PromptBuilder;
use ado_schema::{ApplicationDefinition, FileMap, FileSlot};

/// Fills file slots through the oracle
#[derive(Debug, Clone)]
pub struct FileSynthesizer {
    client: OracleClient,
}

impl FileSynthesizer {
    /// Create file synthesizer
    #[must_use]
    pub fn new(client: OracleClient) -> Self {
        Self { client }
    }

    /// Content for one slot
    ///
    /// Pre-filled content is returned unchanged without calling the oracle.
    ///
    /// # Errors
    /// The [`OracleError`] of the call once its retry budget is spent.
    pub async fn synthesize_file(
        &self,
        slot: &FileSlot,
        ado: &ApplicationDefinition,
    ) -> Result<String, OracleError> {
        if !slot.is_pending() {
            return Ok(slot.content.clone());
        }

        tracing::debug!(path = %slot.path, file_type = %slot.file_type, "synthesizing file");
        let prompt = PromptBuilder::file_content(slot, ado);
        let text = self.client.call(&prompt).await?;
        Ok(text.trim().to_string())
    }

    /// Content for every slot, in declared order
    ///
    /// Stops at the first failure; callers that need per-file containment
    /// drive [`Self::synthesize_file`] themselves.
    ///
    /// # Errors
    /// The first [`OracleError`] encountered.
    pub async fn synthesize_files(
        &self,
        ado: &ApplicationDefinition,
    ) -> Result<FileMap, OracleError> {
        let mut files = FileMap::with_capacity(ado.files.len());
        for slot in &ado.files {
            let content = self.synthesize_file(slot, ado).await?;
            files.insert(slot.path.clone(), content);
        }
        Ok(files)
    }
}
