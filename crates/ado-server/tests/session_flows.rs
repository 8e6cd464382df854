use ado_server::{ChatSession, GenerationSession, Inbound, SessionState};
use ado_synth::OracleError;
use ado_test_utils::{
    definition_without_manifest, fast_streaming, pipeline, sample_definition, three_file_reply,
    RecordingSink, ScriptedOracle, ScriptedSource,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

const APP_SOURCE: &str = "import React from 'react';\n\nexport default function App() {\n  return <main className=\"p-4\">Todo</main>;\n}\n";

fn collapse_chunks(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        if tag == "code_chunk" && out.last().is_some_and(|t| t == "code_chunk") {
            continue;
        }
        out.push(tag);
    }
    out
}

#[tokio::test]
async fn test_generation_event_order() {
    let oracle = Arc::new(ScriptedOracle::texts([
        three_file_reply(),
        "{\"name\": \"todo-app\"}".to_string(),
        APP_SOURCE.to_string(),
        "@tailwind base;".to_string(),
    ]));
    let pipeline = pipeline(oracle.clone());

    let session = GenerationSession::new(&pipeline, RecordingSink::new(), fast_streaming());
    let (state, sink) = session
        .run(json!({"prompt": "simple todo app", "framework": "react"}))
        .await;

    assert_eq!(state, SessionState::Finished);
    assert_eq!(sink.closed, 1);
    assert_eq!(oracle.calls(), 4);

    let expected: Vec<String> = [
        "status",
        "ado_generated",
        "structure_generated",
        "status",
        "file_start",
        "code_chunk",
        "file_end",
        "file_start",
        "code_chunk",
        "file_end",
        "file_start",
        "code_chunk",
        "file_end",
        "finish",
    ]
    .iter()
    .map(ToString::to_string)
    .collect();
    assert_eq!(collapse_chunks(sink.tags("event")), expected);

    let structure = &sink.with_tag("event", "structure_generated")[0];
    assert_eq!(
        structure["files"],
        json!(["package.json", "src/App.jsx", "src/index.css"])
    );

    let ends = sink.with_tag("event", "file_end");
    assert_eq!(ends.last().unwrap()["progress"], 100.0);
    assert!(ends.iter().all(|e| e.get("error").is_none()));

    let streamed: String = sink
        .with_tag("event", "code_chunk")
        .into_iter()
        .filter(|e| e["path"] == "src/App.jsx")
        .map(|e| e["chunk"].as_str().unwrap())
        .collect();
    assert_eq!(streamed, APP_SOURCE.trim());
}

#[tokio::test]
async fn test_generation_warns_about_raw_definition_issues() {
    let oracle = Arc::new(
        ScriptedOracle::texts([definition_without_manifest().to_string()])
            .otherwise("export default function App() {}"),
    );
    let pipeline = pipeline(oracle);

    let (_, sink) = GenerationSession::new(&pipeline, RecordingSink::new(), fast_streaming())
        .run(json!({"prompt": "todo"}))
        .await;

    let tags = sink.tags("event");
    assert_eq!(tags[1], "warning");
    assert_eq!(
        sink.events[1]["message"],
        "ADO validation issues: Missing package.json file"
    );
    assert_eq!(tags.last().unwrap(), "finish");
}

#[tokio::test]
async fn test_generation_requires_prompt() {
    let oracle = Arc::new(ScriptedOracle::always("unused"));
    let pipeline = pipeline(oracle.clone());

    let (state, sink) = GenerationSession::new(&pipeline, RecordingSink::new(), fast_streaming())
        .run(json!({"prompt": "   "}))
        .await;

    assert_eq!(state, SessionState::Failed);
    assert_eq!(sink.events, vec![json!({"event": "error", "message": "Prompt is required."})]);
    assert_eq!(sink.closed, 1);
    assert_eq!(oracle.calls(), 0);
}

#[tokio::test]
async fn test_file_failure_is_reported_and_streaming_continues() {
    let oracle = Arc::new(ScriptedOracle::new([
        Ok(three_file_reply()),
        Ok("{}".to_string()),
        Err(OracleError::quota("daily limit reached")),
        Ok("body {}".to_string()),
    ]));
    let pipeline = pipeline(oracle);

    let (state, sink) = GenerationSession::new(&pipeline, RecordingSink::new(), fast_streaming())
        .run(json!({"prompt": "todo"}))
        .await;

    assert_eq!(state, SessionState::Finished);

    let ends = sink.with_tag("event", "file_end");
    assert_eq!(ends.len(), 3);
    assert!(ends[0].get("error").is_none());
    assert_eq!(ends[1]["path"], "src/App.jsx");
    assert!(ends[1]["error"]
        .as_str()
        .unwrap()
        .starts_with("Failed to generate content:"));
    assert!(ends[2].get("error").is_none());

    let app_chunks = sink
        .with_tag("event", "code_chunk")
        .into_iter()
        .filter(|e| e["path"] == "src/App.jsx")
        .count();
    assert_eq!(app_chunks, 0);
}

#[tokio::test]
async fn test_disconnect_stops_the_session() {
    let oracle = Arc::new(ScriptedOracle::texts([three_file_reply()]).otherwise(APP_SOURCE));
    let pipeline = pipeline(oracle);

    let sink = RecordingSink::disconnect_after(5);
    let (state, sink) = GenerationSession::new(&pipeline, sink, fast_streaming())
        .run(json!({"prompt": "todo"}))
        .await;

    assert_eq!(state, SessionState::Disconnected);
    assert_eq!(sink.events.len(), 5);
    assert_eq!(sink.rejected, 1);
    assert_eq!(sink.closed, 1);
}

#[tokio::test]
async fn test_chat_validation_reports_missing_manifest() {
    let pipeline = pipeline(Arc::new(ScriptedOracle::default()));
    let source = ScriptedSource::new([json!({
        "type": "validate_ado",
        "ado": definition_without_manifest(),
    })]);

    let (handled, sink) = ChatSession::new(&pipeline, RecordingSink::new(), source)
        .run()
        .await;

    assert_eq!(handled, 1);
    assert_eq!(
        sink.events,
        vec![json!({
            "type": "validation_result",
            "valid": false,
            "issues": ["Missing package.json file"],
        })]
    );
    assert_eq!(sink.closed, 1);
}

#[tokio::test]
async fn test_chat_modification_round_trip() {
    let modified = json!({
        "name": "todo-app",
        "files": [
            {"path": "package.json", "type": "json", "content": "{\"name\": \"todo-app\"}"},
            {"path": "src/App.jsx", "type": "jsx", "component": "App"},
            {"path": "src/Footer.jsx", "type": "jsx", "component": "Footer"}
        ],
        "components": [
            {"name": "App", "type": "functional", "file_path": "src/App.jsx"},
            {"name": "Footer", "type": "functional", "file_path": "src/Footer.jsx"}
        ],
        "dependencies": [{"name": "react", "version": "^18.2.0"}, {"name": "react-dom", "version": "^18.2.0"}]
    });
    let oracle = Arc::new(
        ScriptedOracle::texts([modified.to_string()]).otherwise("export default function X() {}"),
    );
    let pipeline = pipeline(oracle.clone());

    let source = ScriptedSource::new([json!({
        "type": "chat_message",
        "message": "add a footer",
        "current_ado": serde_json::to_value(sample_definition()).unwrap(),
    })]);
    let (_, sink) = ChatSession::new(&pipeline, RecordingSink::new(), source)
        .run()
        .await;

    assert_eq!(sink.tags("type"), vec!["status", "chat_response"]);
    let response = &sink.events[1];
    assert_eq!(
        response["response"],
        "I've updated your application based on your request: 'add a footer'"
    );
    assert_eq!(response["updated_ado"]["files"].as_array().unwrap().len(), 3);
    assert_eq!(response["changes"]["package.json"], "{\"name\": \"todo-app\"}");
    assert_eq!(response["changes"]["src/Footer.jsx"], "export default function X() {}");

    // modification prompt, then the two pending slots
    assert_eq!(oracle.calls(), 3);
    assert!(oracle.prompts()[0].contains("add a footer"));
}

#[tokio::test]
async fn test_chat_errors_do_not_end_the_session() {
    let oracle = Arc::new(ScriptedOracle::always("Sure, I added a footer for you."));
    let pipeline = pipeline(oracle);

    let source = ScriptedSource::new([
        json!({"type": "chat_message", "current_ado": {"name": "x"}}),
        json!({"type": "chat_message", "message": "add a footer"}),
        json!({"type": "chat_message", "message": "add a footer", "current_ado": {"name": "x"}}),
        json!({"type": "ping"}),
        json!({"ado": {"name": "x"}}),
        json!({"type": "validate_ado"}),
    ])
    .then(Inbound::Malformed("expected value at line 1 column 1".to_string()))
    .then(Inbound::Message(json!({"type": "validate_ado", "ado": sample_definition()})));

    let (handled, sink) = ChatSession::new(&pipeline, RecordingSink::new(), source)
        .run()
        .await;

    assert_eq!(handled, 8);
    assert_eq!(
        sink.tags("type"),
        vec![
            "error",
            "error",
            "status",
            "error",
            "error",
            "error",
            "error",
            "error",
            "validation_result",
        ]
    );

    let messages: Vec<&str> = sink
        .with_tag("type", "error")
        .into_iter()
        .map(|e| e["message"].as_str().unwrap())
        .collect();
    assert_eq!(messages[0], "Message is required");
    assert_eq!(messages[1], "Either current_ado or current_files is required");
    assert!(messages[2].starts_with("Failed to process modification:"));
    assert_eq!(messages[3], "Unknown message type: ping");
    assert_eq!(messages[4], "Message type is required");
    assert_eq!(messages[5], "ADO is required");
    assert_eq!(messages[6], "Invalid message: expected value at line 1 column 1");

    assert_eq!(sink.events.last().unwrap()["valid"], true);
    assert_eq!(sink.closed, 1);
}
