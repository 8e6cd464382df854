//! Structured object synthesis as a ladder of named strategies
//!
//! ```text
//! FullDirective ──schema failure──▶ SimplifiedDirective ──budget spent──▶ Fallback
//!       │                                   │
//!       └──oracle failure: same rung────────┘
//! ```
//!
//! Every rung before [`Strategy::Fallback`] costs one attempt of a fixed
//! budget. Oracle failures keep the current rung (the client has already
//! backed off between its own attempts); malformed replies step down to the
//! simplified directive. The fallback rung is deterministic and cannot fail.

use crate::decode::parse_definition;
use crate::error::SynthError;
use crate::oracle::OracleClient;
use crate::prompts::PromptBuilder;
use crate::store::RequestKey;
use ado_schema::{
    framework_dependencies, ApplicationDefinition, ComponentSpec, Dependency, FileSlot, FileType,
    GenerationRequest, StyleConfig, MANIFEST_PATH,
};
use std::fmt;

/// Default attempt budget of the ladder
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// One rung of the synthesis ladder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Complete target shape with every enum list embedded
    FullDirective,
    /// Minimal example, used once a reply came back malformed
    SimplifiedDirective,
    /// Deterministic skeleton, no oracle involved
    Fallback,
}

impl Strategy {
    /// Rungs in the order they are tried
    pub const LADDER: [Strategy; 3] = [
        Strategy::FullDirective,
        Strategy::SimplifiedDirective,
        Strategy::Fallback,
    ];

    /// Rung to use after a malformed reply
    ///
    /// The simplified directive is retried until the budget runs out; only
    /// budget exhaustion reaches the fallback.
    #[must_use]
    pub const fn degrade(self) -> Self {
        match self {
            Self::FullDirective | Self::SimplifiedDirective => Self::SimplifiedDirective,
            Self::Fallback => Self::Fallback,
        }
    }

    /// Stable name for logs and metadata
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FullDirective => "full_directive",
            Self::SimplifiedDirective => "simplified_directive",
            Self::Fallback => "fallback",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a synthesis run
#[derive(Debug, Clone, PartialEq)]
pub struct Synthesis {
    /// Synthesized definition
    pub definition: ApplicationDefinition,
    /// Rung that produced it
    pub strategy: Strategy,
    /// Oracle-backed attempts spent
    pub attempts: u32,
    /// Served from the request cache
    pub cached: bool,
}

impl Synthesis {
    /// Whether the deterministic skeleton was returned
    #[inline]
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.strategy == Strategy::Fallback
    }
}

/// Drives the oracle to a schema-valid definition
#[derive(Debug, Clone)]
pub struct Synthesizer {
    client: OracleClient,
    max_attempts: u32,
}

impl Synthesizer {
    /// Create synthesizer with the default attempt budget
    #[must_use]
    pub fn new(client: OracleClient) -> Self {
        Self {
            client,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// With a different attempt budget
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Attempt budget per request
    #[inline]
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Synthesize a definition for `request`
    ///
    /// Never fails once the request is accepted: an exhausted budget yields
    /// the deterministic fallback. Results other than the fallback are
    /// cached by request.
    ///
    /// # Errors
    /// [`SynthError::InvalidRequest`] when the prompt is blank.
    pub async fn synthesize(&self, request: &GenerationRequest) -> Result<Synthesis, SynthError> {
        if !request.has_prompt() {
            return Err(SynthError::InvalidRequest("prompt is required".to_string()));
        }

        let key = RequestKey::for_request(request);
        if let Some(definition) = self.client.store().cached(&key).await {
            tracing::debug!(?key, "definition served from cache");
            return Ok(Synthesis {
                definition,
                strategy: Strategy::FullDirective,
                attempts: 0,
                cached: true,
            });
        }

        let mut strategy = Strategy::FullDirective;
        for attempt in 1..=self.max_attempts {
            match self.attempt(strategy, request).await {
                Ok(definition) => {
                    tracing::info!(%strategy, attempt, name = %definition.name, "definition synthesized");
                    self.client.store().remember(key, definition.clone()).await;
                    return Ok(Synthesis {
                        definition,
                        strategy,
                        attempts: attempt,
                        cached: false,
                    });
                }
                Err(e) if e.is_schema_failure() => {
                    tracing::warn!(%strategy, attempt, error = %e, "malformed definition");
                    strategy = strategy.degrade();
                }
                Err(e) => {
                    tracing::warn!(%strategy, attempt, error = %e, "oracle unavailable");
                }
            }
        }

        tracing::warn!(attempts = self.max_attempts, "synthesis budget spent, using fallback");
        Ok(Synthesis {
            definition: fallback(request),
            strategy: Strategy::Fallback,
            attempts: self.max_attempts,
            cached: false,
        })
    }

    async fn attempt(
        &self,
        strategy: Strategy,
        request: &GenerationRequest,
    ) -> Result<ApplicationDefinition, SynthError> {
        let prompt = match strategy {
            Strategy::FullDirective => PromptBuilder::full_directive(request),
            Strategy::SimplifiedDirective => PromptBuilder::simplified_directive(request),
            Strategy::Fallback => return Ok(fallback(request)),
        };
        let reply = self.client.call(&prompt).await?;
        parse_definition(&reply)
    }
}

/// Deterministic minimal definition for a request
///
/// A manifest plus one top-level component, the framework runtime
/// dependencies and the requested styling framework.
#[must_use]
pub fn fallback(request: &GenerationRequest) -> ApplicationDefinition {
    const APP_PATH: &str = "src/App.jsx";

    let mut component = ComponentSpec::new("App", APP_PATH);
    component.imports = vec!["react".to_string()];
    component.exports = vec!["default".to_string()];
    component.description = Some("Main application component".to_string());

    let mut ado = ApplicationDefinition::new("fallback-app")
        .with_description(format!("Generated app for: {}", request.prompt))
        .with_framework(request.framework.clone())
        .with_file(
            FileSlot::new(MANIFEST_PATH)
                .with_type(FileType::Json)
                .with_description("Package configuration"),
        )
        .with_file(
            FileSlot::new(APP_PATH)
                .with_type(FileType::Jsx)
                .with_description("Main application component")
                .with_component("App"),
        )
        .with_component(component);

    for (name, version) in framework_dependencies("react") {
        ado = ado.with_dependency(Dependency::runtime(*name, *version));
    }

    ado.style_config = StyleConfig {
        framework: request.style_framework,
        ..StyleConfig::default()
    };
    ado
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OracleError;
    use crate::oracle::{Oracle, RetryPolicy};
    use crate::store::{RequestStore, StoreConfig};
    use ado_schema::{AdoValidator, StyleFramework};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::Arc;

    #[derive(Default)]
    struct Scripted {
        replies: Mutex<VecDeque<Result<String, OracleError>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn new(replies: Vec<Result<String, OracleError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                prompts: Mutex::default(),
            })
        }

        fn prompts(&self) -> Vec<String> {
            self.prompts.lock().clone()
        }
    }

    #[async_trait]
    impl Oracle for Scripted {
        async fn generate(&self, prompt: &str) -> Result<String, OracleError> {
            self.prompts.lock().push(prompt.to_string());
            self.replies
                .lock()
                .pop_front()
                .unwrap_or_else(|| Ok("no more scripted replies".to_string()))
        }
    }

    fn synthesizer(oracle: Arc<Scripted>, retry: RetryPolicy) -> Synthesizer {
        Synthesizer::new(OracleClient::new(
            oracle,
            retry,
            Arc::new(RequestStore::new(StoreConfig::unthrottled())),
        ))
    }

    const VALID: &str = r#"{"name": "todo", "files": [{"path": "package.json", "type": "json"}]}"#;

    #[test]
    fn ladder_order() {
        assert_eq!(
            Strategy::LADDER,
            [
                Strategy::FullDirective,
                Strategy::SimplifiedDirective,
                Strategy::Fallback
            ]
        );
        assert_eq!(Strategy::FullDirective.degrade(), Strategy::SimplifiedDirective);
        assert_eq!(Strategy::SimplifiedDirective.degrade(), Strategy::SimplifiedDirective);
    }

    #[test]
    fn fallback_is_valid_after_enrich() {
        let request = GenerationRequest::new("simple todo app").with_style(StyleFramework::Emotion);
        let ado = fallback(&request);

        assert_eq!(ado.files.len(), 2);
        assert_eq!(ado.dependencies.len(), 2);
        assert_eq!(ado.style_config.framework, StyleFramework::Emotion);
        assert_eq!(ado.description.as_deref(), Some("Generated app for: simple todo app"));

        let validator = AdoValidator::new();
        assert!(validator.validate(&validator.enrich(ado)).is_empty());
    }

    #[tokio::test]
    async fn first_valid_reply_wins() {
        let oracle = Scripted::new(vec![Ok(VALID.to_string())]);
        let synthesis = synthesizer(oracle.clone(), RetryPolicy::immediate(1))
            .synthesize(&GenerationRequest::new("todo"))
            .await
            .unwrap();

        assert_eq!(synthesis.strategy, Strategy::FullDirective);
        assert_eq!(synthesis.attempts, 1);
        assert_eq!(synthesis.definition.name, "todo");
        assert_eq!(oracle.prompts().len(), 1);
    }

    #[tokio::test]
    async fn malformed_reply_degrades_prompt() {
        let oracle = Scripted::new(vec![Ok("not json".to_string()), Ok(VALID.to_string())]);
        let synthesis = synthesizer(oracle.clone(), RetryPolicy::immediate(1))
            .synthesize(&GenerationRequest::new("todo"))
            .await
            .unwrap();

        assert_eq!(synthesis.strategy, Strategy::SimplifiedDirective);
        assert_eq!(synthesis.attempts, 2);

        let prompts = oracle.prompts();
        assert!(prompts[0].starts_with("Create a complete Application Definition Object"));
        assert!(prompts[1].starts_with("Generate a simple JSON"));
    }

    #[tokio::test]
    async fn oracle_failure_keeps_prompt() {
        let oracle = Scripted::new(vec![
            Err(OracleError::transport("down")),
            Ok(VALID.to_string()),
        ]);
        let synthesis = synthesizer(oracle.clone(), RetryPolicy::immediate(1))
            .synthesize(&GenerationRequest::new("todo"))
            .await
            .unwrap();

        assert_eq!(synthesis.strategy, Strategy::FullDirective);
        assert_eq!(synthesis.attempts, 2);
        let prompts = oracle.prompts();
        assert_eq!(prompts[0], prompts[1]);
    }

    #[tokio::test]
    async fn exhausted_budget_falls_back() {
        let oracle = Scripted::new(vec![Err(OracleError::quota("limit")); 3]);
        let synthesis = synthesizer(oracle.clone(), RetryPolicy::immediate(1))
            .synthesize(&GenerationRequest::new("todo"))
            .await
            .unwrap();

        assert!(synthesis.is_fallback());
        assert_eq!(synthesis.attempts, 3);
        assert_eq!(synthesis.definition.name, "fallback-app");
    }

    #[tokio::test]
    async fn blank_prompt_is_rejected() {
        let oracle = Scripted::new(vec![]);
        let err = synthesizer(oracle.clone(), RetryPolicy::immediate(1))
            .synthesize(&GenerationRequest::new("   "))
            .await
            .unwrap_err();

        assert!(matches!(err, SynthError::InvalidRequest(_)));
        assert!(oracle.prompts().is_empty());
    }

    #[tokio::test]
    async fn successful_result_is_cached() {
        let oracle = Scripted::new(vec![Ok(VALID.to_string())]);
        let synth = synthesizer(oracle.clone(), RetryPolicy::immediate(1));
        let request = GenerationRequest::new("todo");

        synth.synthesize(&request).await.unwrap();
        let again = synth.synthesize(&request).await.unwrap();

        assert!(again.cached);
        assert_eq!(again.definition.name, "todo");
        assert_eq!(oracle.prompts().len(), 1);
    }

    #[tokio::test]
    async fn fallback_is_not_cached() {
        let oracle = Scripted::new(vec![Ok("prose".to_string()); 3]);
        let synth = synthesizer(oracle.clone(), RetryPolicy::immediate(1));
        let request = GenerationRequest::new("todo");

        assert!(synth.synthesize(&request).await.unwrap().is_fallback());
        let again = synth.synthesize(&request).await.unwrap();

        assert!(!again.cached);
        assert_eq!(oracle.prompts().len(), 6);
    }
}
