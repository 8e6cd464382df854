use ado_schema::{AdoValidator, FileType, GenerationRequest, StyleFramework};
use ado_synth::{ModificationRequest, ModifyError, OracleError, RetryPolicy, Strategy};
use ado_test_utils::{pipeline, pipeline_with_retry, sample_definition, ScriptedOracle};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_prose_only_oracle_yields_valid_fallback() {
    let oracle = Arc::new(ScriptedOracle::always("I'm sorry, I can only describe apps in prose."));
    let pipeline = pipeline(oracle.clone());

    let request = GenerationRequest::new("simple todo app").with_framework("react");
    let synthesis = pipeline.synthesizer().synthesize(&request).await.unwrap();

    assert_eq!(oracle.calls(), 3);
    assert_eq!(synthesis.strategy, Strategy::Fallback);
    assert_eq!(synthesis.definition.files.len(), 2);
    assert_eq!(synthesis.definition.dependencies.len(), 2);

    let validator = AdoValidator::new();
    assert!(validator.validate(&synthesis.definition).is_empty());
    assert!(validator
        .validate(&validator.enrich(synthesis.definition))
        .is_empty());
}

#[tokio::test]
async fn test_unknown_file_type_is_repaired_without_retry() {
    let oracle = Arc::new(ScriptedOracle::texts([
        r#"{"files": [{"path": "a.xyz", "type": "weird", "content": ""}]}"#,
    ]));
    let pipeline = pipeline(oracle.clone());

    let synthesis = pipeline
        .synthesizer()
        .synthesize(&GenerationRequest::new("odd files"))
        .await
        .unwrap();

    assert_eq!(oracle.calls(), 1);
    assert_eq!(synthesis.attempts, 1);
    assert_eq!(synthesis.strategy, Strategy::FullDirective);
    assert_eq!(synthesis.definition.files[0].file_type, FileType::Js);
}

#[tokio::test]
async fn test_namespaced_style_and_string_props_are_repaired() {
    let oracle = Arc::new(ScriptedOracle::texts([r#"Sure! ```json
{
  "name": "card",
  "files": [{"path": "src/Card.tsx", "type": ".TSX", "content": ""}],
  "components": [{"name": "Card", "type": "widget", "file_path": "src/Card.tsx", "props": ["title", "subtitle"]}],
  "style_config": {"framework": "StyleFramework.TAILWIND"}
}
``` Let me know if you need anything else."#]));
    let pipeline = pipeline(oracle);

    let ado = pipeline
        .synthesizer()
        .synthesize(&GenerationRequest::new("a card"))
        .await
        .unwrap()
        .definition;

    assert_eq!(ado.files[0].file_type, FileType::Tsx);
    assert_eq!(ado.style_config.framework, StyleFramework::Tailwind);

    let card = ado.component("Card").unwrap();
    assert_eq!(card.props.len(), 2);
    assert_eq!(card.props[1].name, "subtitle");
    assert_eq!(card.props[1].prop_type, "string");
    assert!(!card.props[1].required);
    assert!(card.props[1].description.as_deref().unwrap().contains("subtitle"));
}

#[tokio::test(start_paused = true)]
async fn test_transport_failures_back_off_then_fall_back() {
    let oracle = Arc::new(ScriptedOracle::new(
        std::iter::repeat(Err(OracleError::transport("connection reset"))).take(9),
    ));
    let pipeline = pipeline_with_retry(
        oracle.clone(),
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(100),
        },
    );

    let start = tokio::time::Instant::now();
    let synthesis = pipeline
        .synthesizer()
        .synthesize(&GenerationRequest::new("todo"))
        .await
        .unwrap();

    assert!(synthesis.is_fallback());
    assert_eq!(oracle.calls(), 9);
    // 3 ladder attempts, each backing off 100ms + 200ms between its 3 calls
    assert_eq!(start.elapsed(), Duration::from_millis(900));
}

#[tokio::test]
async fn test_generate_project_end_to_end() {
    let oracle = Arc::new(
        ScriptedOracle::texts([ado_test_utils::three_file_reply()])
            .otherwise("  export default function App() { return null; }  "),
    );
    let response = pipeline(oracle)
        .generate_project(&GenerationRequest::new("todo"))
        .await;

    assert!(response.success);
    assert!(response.errors.is_empty());
    assert!(response.warnings.is_empty());
    assert_eq!(response.files.len(), 3);
    assert_eq!(
        response.files["src/App.jsx"],
        "export default function App() { return null; }"
    );

    let ado = response.ado.unwrap();
    assert!(ado.has_dependency("tailwindcss"));
    assert!(ado.has_dependency("postcss"));
}

#[tokio::test]
async fn test_modification_never_substitutes_fallback() {
    let oracle = Arc::new(ScriptedOracle::always("Done! I added a footer."));
    let pipeline = pipeline(oracle.clone());

    let err = pipeline
        .modifier()
        .modify(&ModificationRequest::new("add a footer", sample_definition()))
        .await
        .unwrap_err();

    assert!(matches!(err, ModifyError::Synthesis(_)));
    assert_eq!(oracle.calls(), 1);
}

#[tokio::test]
async fn test_revise_returns_definition_and_files() {
    let oracle = Arc::new(
        ScriptedOracle::texts([r#"{"name": "todo-app", "files": [
                {"path": "package.json", "type": "json", "content": "{\"name\": \"todo-app\"}"},
                {"path": "src/Footer.jsx", "type": "jsx"}
            ]}"#])
        .otherwise("export default function Footer() {}"),
    );
    let pipeline = pipeline(oracle);

    let request = ModificationRequest::new("add a footer", sample_definition())
        .with_targets(["src/Footer.jsx"]);
    let (ado, files) = pipeline.revise(&request).await.unwrap();

    assert_eq!(ado.files.len(), 2);
    assert_eq!(files["package.json"], "{\"name\": \"todo-app\"}");
    assert_eq!(files["src/Footer.jsx"], "export default function Footer() {}");
}

#[tokio::test]
async fn test_revision_without_name_keeps_project_name() {
    let oracle = Arc::new(
        ScriptedOracle::texts([r#"{"files": [
                {"path": "package.json", "type": "json"},
                {"path": "src/Footer.jsx", "type": "jsx"}
            ]}"#])
        .otherwise("export default function Footer() {}"),
    );
    let pipeline = pipeline(oracle);

    let request = ModificationRequest::new("add a footer", sample_definition());
    let (ado, _) = pipeline.revise(&request).await.unwrap();

    assert_eq!(ado.name, "todo-app");
    assert_ne!(ado.name, ado_synth::repair::DEFAULT_NAME);
}
