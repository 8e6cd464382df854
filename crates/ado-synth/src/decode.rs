//! Reply decoding: extract, repair, then strict decode
//!
//! The reply is never decoded straight into [`ApplicationDefinition`].
//! It is parsed into a loose JSON tree first, repaired, and only then
//! handed to serde.

use crate::error::SynthError;
use crate::extract::extract_value;
use crate::repair::repair;
use ado_schema::ApplicationDefinition;
use serde_json::Value;

/// Decode an oracle reply into a definition
///
/// # Errors
/// - [`SynthError::Extraction`] when the reply has no JSON object
/// - [`SynthError::Decode`] when the repaired object is not a valid definition
pub fn parse_definition(reply: &str) -> Result<ApplicationDefinition, SynthError> {
    let value = extract_value(reply)?;
    decode_value(value)
}

/// Repair and decode an already-parsed JSON value
///
/// # Errors
/// [`SynthError::Decode`] when the value is not an object or does not
/// decode after repair.
pub fn decode_value(mut value: Value) -> Result<ApplicationDefinition, SynthError> {
    if !value.is_object() {
        return Err(SynthError::Decode("expected a JSON object".to_string()));
    }

    let fixes = repair(&mut value);
    for fix in &fixes {
        tracing::trace!(%fix, "repair");
    }

    serde_json::from_value(value).map_err(|e| SynthError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ado_schema::{ComponentKind, FileType, StyleFramework};

    #[test]
    fn decodes_fenced_reply_with_repairs() {
        let reply = r#"Here is the definition:
```json
{
  "name": "todo",
  "files": [{"path": "src/App.tsx", "type": "TypeScriptReact", "content": ""}],
  "components": [{"name": "App", "type": "Screen", "filePath": "src/App.tsx", "props": ["title"]}],
  "dependencies": {"react": "^18.2.0"},
  "style_config": {"framework": "StyleFramework.EMOTION"}
}
```"#;
        let ado = parse_definition(reply).unwrap();

        assert_eq!(ado.name, "todo");
        assert_eq!(ado.files[0].file_type, FileType::Tsx);
        assert_eq!(ado.components[0].kind, ComponentKind::Functional);
        assert_eq!(ado.components[0].props[0].name, "title");
        assert_eq!(ado.style_config.framework, StyleFramework::Emotion);
        assert!(ado.has_dependency("react"));
    }

    #[test]
    fn prose_is_extraction_failure() {
        let err = parse_definition("Sorry, I can't do that").unwrap_err();
        assert!(matches!(err, SynthError::Extraction(_)));
        assert!(err.is_schema_failure());
    }

    #[test]
    fn missing_name_is_filled() {
        let ado = parse_definition(r#"{"files": []}"#).unwrap();
        assert_eq!(ado.name, crate::repair::DEFAULT_NAME);
    }

    #[test]
    fn missing_file_path_is_decode_failure() {
        let err = parse_definition(r#"{"name": "x", "files": [{"type": "js"}]}"#).unwrap_err();
        assert!(matches!(err, SynthError::Decode(_)));
        assert!(err.is_schema_failure());
    }

    #[test]
    fn wrong_field_type_is_decode_failure() {
        let err = parse_definition(r#"{"name": "x", "files": "none"}"#).unwrap_err();
        assert!(matches!(err, SynthError::Decode(_)));
    }

    #[test]
    fn non_object_value_is_decode_failure() {
        let err = decode_value(serde_json::json!([1])).unwrap_err();
        assert!(matches!(err, SynthError::Decode(_)));
    }
}
