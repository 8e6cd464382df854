//! Repair of known oracle deviations on the loosely-typed JSON tree
//!
//! Each transform is pure and keyed by a field path of the definition.
//! They run before the strict decode so that common near-misses become
//! valid instead of costing a whole retry:
//! - camelCase keys are renamed to the canonical snake_case keys
//! - dependency maps become dependency lists
//! - bare-string props become full prop records
//! - namespaced or misspelled styling frameworks map to a canonical value
//! - unknown file types are re-inferred from the path suffix
//! - unknown component types become `functional`
//! - a missing project name becomes [`DEFAULT_NAME`]

use ado_schema::{ComponentKind, FileType, StyleFramework};
use serde_json::{json, Map, Value};

/// Notes describing each applied fix, for logging
pub type RepairLog = Vec<String>;

/// Project name used when the oracle omits one
pub const DEFAULT_NAME: &str = "generated-app";

const KEY_ALIASES: &[(&str, &str)] = &[
    ("styleConfig", "style_config"),
    ("stateDefinitions", "state_definitions"),
    ("stateDefs", "state_definitions"),
    ("state_defs", "state_definitions"),
    ("apiEndpoints", "api_endpoints"),
    ("buildConfig", "build_config"),
    ("generationMetadata", "generation_metadata"),
    ("devDependencies", "dev_dependencies"),
    ("filePath", "file_path"),
    ("defaultValue", "default_value"),
    ("default", "default_value"),
    ("customCss", "custom_css"),
    ("isDev", "dev"),
    ("is_dev", "dev"),
    ("componentRef", "component"),
    ("component_ref", "component"),
    ("initialValue", "initial_value"),
    ("requestSchema", "request_schema"),
    ("responseSchema", "response_schema"),
];

const STYLE_SYNONYMS: &[(&str, StyleFramework)] = &[
    ("tailwind", StyleFramework::Tailwind),
    ("tailwindcss", StyleFramework::Tailwind),
    ("tailwind-css", StyleFramework::Tailwind),
    ("styled", StyleFramework::StyledComponents),
    ("styledcomponents", StyleFramework::StyledComponents),
    ("styled_components", StyleFramework::StyledComponents),
    ("styled-components", StyleFramework::StyledComponents),
    ("emotion", StyleFramework::Emotion),
    ("cssmodules", StyleFramework::CssModules),
    ("css_modules", StyleFramework::CssModules),
    ("css-modules", StyleFramework::CssModules),
    ("css", StyleFramework::VanillaCss),
    ("vanilla", StyleFramework::VanillaCss),
    ("vanillacss", StyleFramework::VanillaCss),
    ("vanilla_css", StyleFramework::VanillaCss),
    ("vanilla-css", StyleFramework::VanillaCss),
];

/// Styling framework used when a spelling cannot be mapped
pub const DEFAULT_STYLE: StyleFramework = StyleFramework::Tailwind;

/// Normalize a free-text styling framework spelling
///
/// Keeps the last dotted segment, lower-cases it and maps it through the
/// synonym table, falling back to [`DEFAULT_STYLE`].
#[must_use]
pub fn normalize_style(raw: &str) -> StyleFramework {
    let segment = raw.rsplit('.').next().unwrap_or(raw).trim().to_lowercase();
    STYLE_SYNONYMS
        .iter()
        .find(|(alias, _)| *alias == segment)
        .map_or(DEFAULT_STYLE, |(_, style)| *style)
}

/// Resolve a declared file type, re-inferring from the path when unknown
#[must_use]
pub fn normalize_file_type(declared: Option<&str>, path: &str) -> FileType {
    declared
        .map(|t| t.trim().trim_start_matches('.').to_lowercase())
        .and_then(|t| t.parse::<FileType>().ok())
        .unwrap_or_else(|| FileType::from_path(path))
}

/// Resolve a declared component kind, defaulting to functional
#[must_use]
pub fn normalize_component_kind(declared: Option<&str>) -> ComponentKind {
    declared
        .and_then(|k| k.trim().to_lowercase().parse::<ComponentKind>().ok())
        .unwrap_or_default()
}

/// Full prop record for a prop given as a bare name
#[must_use]
pub fn prop_from_name(name: &str) -> Value {
    json!({
        "name": name,
        "type": "string",
        "required": false,
        "default_value": "",
        "description": format!("Property: {name}"),
    })
}

/// Apply every repair transform in place
pub fn repair(root: &mut Value) -> RepairLog {
    let mut log = RepairLog::new();
    let Some(obj) = root.as_object_mut() else {
        return log;
    };

    rename_keys(obj, &mut log);
    repair_name(obj, &mut log);
    repair_dependencies(obj, &mut log);
    repair_style(obj, &mut log);
    repair_files(obj, &mut log);
    repair_components(obj, &mut log);

    for section in ["routes", "state_definitions", "api_endpoints"] {
        for item in objects_mut(obj, section) {
            rename_keys(item, &mut log);
        }
    }

    if !log.is_empty() {
        tracing::debug!(fixes = log.len(), "repaired oracle output");
    }
    log
}

fn rename_keys(obj: &mut Map<String, Value>, log: &mut RepairLog) {
    for (alias, canonical) in KEY_ALIASES {
        if obj.contains_key(*canonical) {
            continue;
        }
        if let Some(value) = obj.remove(*alias) {
            log.push(format!("renamed key {alias} to {canonical}"));
            obj.insert((*canonical).to_string(), value);
        }
    }
}

fn repair_name(obj: &mut Map<String, Value>, log: &mut RepairLog) {
    if obj.get("name").map_or(true, Value::is_null) {
        log.push(format!("filled missing name with {DEFAULT_NAME}"));
        obj.insert("name".to_string(), Value::String(DEFAULT_NAME.to_string()));
    }
}

fn objects_mut<'a>(
    obj: &'a mut Map<String, Value>,
    key: &str,
) -> impl Iterator<Item = &'a mut Map<String, Value>> {
    obj.get_mut(key)
        .and_then(Value::as_array_mut)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object_mut)
}

fn dependency_list(value: Value, dev: bool, log: &mut RepairLog) -> Vec<Value> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(name) => {
                    log.push(format!("expanded dependency {name}"));
                    json!({"name": name, "version": "latest", "dev": dev})
                }
                Value::Object(mut entry) => {
                    rename_keys(&mut entry, log);
                    if dev {
                        entry.entry("dev").or_insert(Value::Bool(true));
                    }
                    Value::Object(entry)
                }
                other => other,
            })
            .collect(),
        Value::Object(map) => {
            log.push("converted dependency map to list".to_string());
            map.into_iter()
                .map(|(name, version)| {
                    let version = match version {
                        Value::String(v) => v,
                        other => other.to_string(),
                    };
                    json!({"name": name, "version": version, "dev": dev})
                })
                .collect()
        }
        other => vec![other],
    }
}

fn repair_dependencies(obj: &mut Map<String, Value>, log: &mut RepairLog) {
    let mut deps = obj
        .remove("dependencies")
        .map(|v| dependency_list(v, false, log))
        .unwrap_or_default();

    if let Some(dev) = obj.remove("dev_dependencies") {
        deps.extend(dependency_list(dev, true, log));
    }

    obj.insert("dependencies".to_string(), Value::Array(deps));
}

fn repair_style(obj: &mut Map<String, Value>, log: &mut RepairLog) {
    let Some(style) = obj.get_mut("style_config").and_then(Value::as_object_mut) else {
        return;
    };
    rename_keys(style, log);

    let Some(Value::String(raw)) = style.get("framework") else {
        return;
    };
    if raw.parse::<StyleFramework>().is_ok() {
        return;
    }

    let normalized = normalize_style(raw);
    log.push(format!("style framework {raw} normalized to {normalized}"));
    style.insert(
        "framework".to_string(),
        Value::String(normalized.as_str().to_string()),
    );
}

fn repair_files(obj: &mut Map<String, Value>, log: &mut RepairLog) {
    for file in objects_mut(obj, "files") {
        rename_keys(file, log);

        let declared = file.get("type").and_then(Value::as_str);
        if declared.is_some_and(|t| t.parse::<FileType>().is_ok()) {
            continue;
        }

        let path = file.get("path").and_then(Value::as_str).unwrap_or_default();
        let inferred = normalize_file_type(declared, path);
        log.push(format!("file {path} type set to {inferred}"));
        file.insert("type".to_string(), Value::String(inferred.as_str().to_string()));
    }
}

fn repair_components(obj: &mut Map<String, Value>, log: &mut RepairLog) {
    for component in objects_mut(obj, "components") {
        rename_keys(component, log);

        let declared = component.get("type").and_then(Value::as_str);
        if !declared.is_some_and(|k| k.parse::<ComponentKind>().is_ok()) {
            let kind = normalize_component_kind(declared);
            log.push(format!("component type set to {kind}"));
            component.insert("type".to_string(), Value::String(kind.as_str().to_string()));
        }

        if let Some(props) = component.remove("props") {
            let repaired = repair_props(props, log);
            component.insert("props".to_string(), repaired);
        }
    }
}

fn repair_props(props: Value, log: &mut RepairLog) -> Value {
    let items = match props {
        Value::Array(items) => items,
        Value::Object(map) => {
            log.push("converted prop map to list".to_string());
            map.into_iter()
                .map(|(name, ty)| {
                    let mut prop = prop_from_name(&name);
                    if let Value::String(ty) = ty {
                        prop["type"] = Value::String(ty);
                    }
                    prop
                })
                .collect()
        }
        other => return other,
    };

    Value::Array(
        items
            .into_iter()
            .map(|prop| match prop {
                Value::String(name) => {
                    log.push(format!("expanded prop {name}"));
                    prop_from_name(&name)
                }
                Value::Object(mut fields) => {
                    rename_keys(&mut fields, log);
                    fields
                        .entry("name")
                        .or_insert_with(|| Value::String("unknown".to_string()));
                    fields
                        .entry("type")
                        .or_insert_with(|| Value::String("string".to_string()));
                    fields.entry("required").or_insert(Value::Bool(false));
                    fields
                        .entry("default_value")
                        .or_insert_with(|| Value::String(String::new()));
                    fields
                        .entry("description")
                        .or_insert_with(|| Value::String(String::new()));
                    Value::Object(fields)
                }
                other => other,
            })
            .collect(),
    )
}
