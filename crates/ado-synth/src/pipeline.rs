//! Pipeline facade
//!
//! Wires one oracle client into the synthesizer, the file synthesizer and
//! the modifier, and offers the non-streaming request/response surface.

use crate::error::{ModifyError, SynthError};
use crate::files::FileSynthesizer;
use crate::ladder::{Strategy, Synthesis, Synthesizer};
use crate::modify::{ModificationRequest, Modifier};
use crate::oracle::{Oracle, OracleClient, RetryPolicy};
use crate::store::RequestStore;
use ado_schema::{
    AdoValidator, ApplicationDefinition, FileMap, GenerationRequest, GenerationResponse,
    Passthrough,
};
use serde_json::Value;
use std::sync::Arc;

/// A synthesized, validated and enriched definition ready for delivery
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    /// Enriched definition
    pub definition: ApplicationDefinition,
    /// Validator issues found before enrichment
    pub issues: Vec<String>,
    /// Rung that produced the definition
    pub strategy: Strategy,
    /// Oracle-backed attempts spent
    pub attempts: u32,
    /// Served from the request cache
    pub cached: bool,
}

impl Plan {
    /// Synthesis metadata for responses
    #[must_use]
    pub fn metadata(&self) -> Passthrough {
        let mut meta = Passthrough::new();
        meta.insert("strategy".into(), Value::from(self.strategy.as_str()));
        meta.insert("attempts".into(), Value::from(self.attempts));
        meta.insert("cached".into(), Value::from(self.cached));
        meta.insert(
            "generated_at".into(),
            Value::from(chrono::Utc::now().to_rfc3339()),
        );
        meta
    }
}

/// Shared synthesis machinery
#[derive(Debug, Clone)]
pub struct Pipeline {
    synthesizer: Synthesizer,
    files: FileSynthesizer,
    modifier: Modifier,
    validator: AdoValidator,
}

impl Pipeline {
    /// Create pipeline around one oracle
    #[must_use]
    pub fn new(oracle: Arc<dyn Oracle>, retry: RetryPolicy, store: Arc<RequestStore>) -> Self {
        Self::from_client(OracleClient::new(oracle, retry, store))
    }

    /// Create pipeline from a configured client
    #[must_use]
    pub fn from_client(client: OracleClient) -> Self {
        Self {
            synthesizer: Synthesizer::new(client.clone()),
            files: FileSynthesizer::new(client.clone()),
            modifier: Modifier::new(client),
            validator: AdoValidator::new(),
        }
    }

    /// With a different ladder budget
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.synthesizer = self.synthesizer.with_max_attempts(max_attempts);
        self
    }

    /// Structured object synthesizer
    #[inline]
    #[must_use]
    pub fn synthesizer(&self) -> &Synthesizer {
        &self.synthesizer
    }

    /// File content synthesizer
    #[inline]
    #[must_use]
    pub fn files(&self) -> &FileSynthesizer {
        &self.files
    }

    /// Modification pipeline
    #[inline]
    #[must_use]
    pub fn modifier(&self) -> &Modifier {
        &self.modifier
    }

    /// Validator
    #[inline]
    #[must_use]
    pub fn validator(&self) -> &AdoValidator {
        &self.validator
    }

    /// Synthesize, validate and enrich a definition
    ///
    /// # Errors
    /// [`SynthError::InvalidRequest`] for a blank prompt.
    pub async fn plan(&self, request: &GenerationRequest) -> Result<Plan, SynthError> {
        let Synthesis {
            definition,
            strategy,
            attempts,
            cached,
        } = self.synthesizer.synthesize(request).await?;

        let issues = self.validator.validate(&definition);
        if !issues.is_empty() {
            tracing::warn!(issues = ?issues, "definition has validation issues");
        }

        Ok(Plan {
            definition: self.validator.enrich(definition),
            issues,
            strategy,
            attempts,
            cached,
        })
    }

    /// Apply a change request and synthesize the files of the result
    ///
    /// # Errors
    /// [`ModifyError`] when the change or any file synthesis fails.
    pub async fn revise(
        &self,
        request: &ModificationRequest,
    ) -> Result<(ApplicationDefinition, FileMap), ModifyError> {
        let modified = self.modifier.modify(request).await?;
        let files = self
            .files
            .synthesize_files(&modified)
            .await
            .map_err(SynthError::from)?;
        Ok((modified, files))
    }

    /// Non-streaming generation
    ///
    /// Per-file failures are reported in `errors` without dropping the
    /// files that did synthesize.
    pub async fn generate_project(&self, request: &GenerationRequest) -> GenerationResponse {
        let plan = match self.plan(request).await {
            Ok(plan) => plan,
            Err(e) => return GenerationResponse::failure(e.to_string()),
        };

        let mut files = FileMap::with_capacity(plan.definition.files.len());
        let mut errors = Vec::new();
        for slot in &plan.definition.files {
            match self.files.synthesize_file(slot, &plan.definition).await {
                Ok(content) => {
                    files.insert(slot.path.clone(), content);
                }
                Err(e) => {
                    tracing::warn!(path = %slot.path, error = %e, "file synthesis failed");
                    errors.push(format!("Failed to generate {}: {}", slot.path, e.describe()));
                }
            }
        }

        GenerationResponse {
            success: errors.is_empty(),
            generation_metadata: plan.metadata(),
            warnings: plan.issues,
            ado: Some(plan.definition),
            files,
            errors,
        }
    }
}
