use ado_schema::{FileType, StyleFramework};
use ado_synth::decode::decode_value;
use ado_synth::repair::{normalize_file_type, normalize_style, repair};
use ado_synth::{extract_value, parse_definition, SynthError};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

#[test]
fn test_prose_without_object_is_a_schema_failure() {
    let err = parse_definition("I cannot help with that request.").unwrap_err();
    assert!(err.is_schema_failure());
    assert!(matches!(err, SynthError::Extraction(_)));
}

#[test]
fn test_non_object_payload_is_rejected() {
    assert!(decode_value(json!(["not", "a", "definition"])).is_err());
}

#[test]
fn test_style_synonyms() {
    assert_eq!(
        normalize_style("StyleFramework.STYLED_COMPONENTS"),
        StyleFramework::StyledComponents
    );
    assert_eq!(normalize_style("vanilla-css"), StyleFramework::VanillaCss);
    assert_eq!(normalize_style("bootstrap"), StyleFramework::Tailwind);
    assert_eq!(normalize_file_type(None, "src/theme.scss"), FileType::Scss);
}

fn prose() -> impl Strategy<Value = String> {
    "[A-Za-z ,.!?:]{0,40}"
}

fn flat_object() -> impl Strategy<Value = Map<String, Value>> {
    prop::collection::btree_map("[a-z_]{1,10}", "[a-z0-9 {}]{0,12}", 1..6).prop_map(|entries| {
        entries
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect()
    })
}

proptest! {
    #[test]
    fn prop_object_is_found_inside_prose(
        before in prose(),
        after in prose(),
        object in flat_object(),
        fenced in any::<bool>(),
    ) {
        let body = Value::Object(object.clone()).to_string();
        let reply = if fenced {
            format!("{before}\n```json\n{body}\n```\n{after}")
        } else {
            format!("{before} {body} {after}")
        };

        prop_assert_eq!(extract_value(&reply).unwrap(), Value::Object(object));
    }

    #[test]
    fn prop_dependency_maps_become_lists(
        deps in prop::collection::btree_map("[a-z][a-z-]{0,10}", "\\^[0-9]\\.[0-9]\\.[0-9]", 0..6),
    ) {
        let mut value = json!({"name": "app", "dependencies": deps.clone()});
        repair(&mut value);

        let ado = decode_value(value).unwrap();
        let names: Vec<&str> = ado.dependency_names();
        let expected: Vec<&str> = deps.keys().map(String::as_str).collect();
        prop_assert_eq!(names, expected);
        prop_assert!(ado.dependencies.iter().all(|d| !d.dev));
    }

    #[test]
    fn prop_unknown_file_types_follow_the_path(
        stem in "[a-z]{1,8}",
        declared in "[a-z]{3,8}",
    ) {
        prop_assume!(declared.parse::<FileType>().is_err());
        let path = format!("src/{stem}.tsx");
        prop_assert_eq!(normalize_file_type(Some(&declared), &path), FileType::Tsx);
    }
}
