//! Best-effort reconstruction of a definition from raw file contents
//!
//! Used when a client holds files but no definition. Types come from path
//! suffixes, components from default exports in JSX/TSX sources and
//! dependencies from a `package.json` manifest when one parses.

use crate::model::{ApplicationDefinition, ComponentSpec, Dependency, FileSlot, MANIFEST_PATH};
use indexmap::IndexMap;
use serde_json::Value;
use std::path::Path;

/// Manifest locations probed, in order
const MANIFEST_CANDIDATES: [&str; 2] = [MANIFEST_PATH, "frontend/package.json"];

/// Marker that identifies a component module
const COMPONENT_MARKER: &str = "export default";

impl ApplicationDefinition {
    /// Rebuild a skeleton definition from a path→content mapping
    ///
    /// Never fails: an unparsable manifest simply contributes no
    /// dependencies.
    #[must_use]
    pub fn from_files(files: &IndexMap<String, String>) -> Self {
        let mut ado = ApplicationDefinition::new("existing-app")
            .with_description("Application created from existing files")
            .with_framework("react");

        for (path, content) in files {
            let slot = FileSlot::new(path.as_str())
                .with_content(content.as_str())
                .with_description("Generated from existing file");

            if slot.file_type.is_component_source() && content.contains(COMPONENT_MARKER) {
                let name = component_name(path);
                let mut component = ComponentSpec::new(name.clone(), path.as_str());
                component.exports = vec!["default".to_string()];
                component.description = Some(format!("Component from {path}"));
                ado.components.push(component);
                ado.files.push(slot.with_component(name));
            } else {
                ado.files.push(slot);
            }
        }

        let manifest = MANIFEST_CANDIDATES
            .iter()
            .find_map(|candidate| files.get(*candidate));
        if let Some(manifest) = manifest {
            ado.dependencies = manifest_dependencies(manifest);
        }

        ado
    }
}

fn component_name(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

fn manifest_dependencies(manifest: &str) -> Vec<Dependency> {
    let Ok(value) = serde_json::from_str::<Value>(manifest) else {
        tracing::debug!("manifest is not valid JSON, skipping dependencies");
        return Vec::new();
    };

    let mut out = Vec::new();
    for (section, dev) in [("dependencies", false), ("devDependencies", true)] {
        if let Some(Value::Object(entries)) = value.get(section) {
            for (name, version) in entries {
                let version = match version {
                    Value::String(v) => v.clone(),
                    other => other.to_string(),
                };
                out.push(Dependency {
                    name: name.clone(),
                    version,
                    dev,
                });
            }
        }
    }
    out
}
