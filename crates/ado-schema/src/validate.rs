//! Validation and enrichment of definitions
//!
//! Validation never fails: it reports one human-readable issue per
//! violated invariant and an empty list means the definition is valid.
//! Enrichment appends the dependencies a framework or styling choice
//! implies and is idempotent.

use crate::model::{ApplicationDefinition, Dependency, StyleFramework, MANIFEST_PATH};
use std::collections::{HashMap, HashSet};

/// Runtime packages implied by a framework tag
#[must_use]
pub fn framework_dependencies(framework: &str) -> &'static [(&'static str, &'static str)] {
    match framework {
        "react" => &[("react", "^18.2.0"), ("react-dom", "^18.2.0")],
        _ => &[],
    }
}

/// Packages implied by a styling framework, with their dev flag
#[must_use]
pub fn style_dependencies(style: StyleFramework) -> &'static [(&'static str, &'static str, bool)] {
    match style {
        StyleFramework::Tailwind => &[
            ("tailwindcss", "^3.3.0", true),
            ("autoprefixer", "^10.4.14", true),
            ("postcss", "^8.4.24", true),
        ],
        StyleFramework::StyledComponents => &[("styled-components", "^6.1.0", false)],
        StyleFramework::Emotion => &[
            ("@emotion/react", "^11.11.0", false),
            ("@emotion/styled", "^11.11.0", false),
        ],
        StyleFramework::CssModules | StyleFramework::VanillaCss => &[],
    }
}

/// Validator and enricher for [`ApplicationDefinition`]
#[derive(Debug, Clone, Copy, Default)]
pub struct AdoValidator;

impl AdoValidator {
    /// Create validator
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Check cross-reference invariants
    ///
    /// Reports, in order:
    /// - a missing root manifest
    /// - duplicate file paths
    /// - components whose file path is not a declared file slot
    /// - framework-implied dependencies that are not declared
    #[must_use]
    pub fn validate(&self, ado: &ApplicationDefinition) -> Vec<String> {
        let mut issues = Vec::new();

        if ado.file(MANIFEST_PATH).is_none() {
            issues.push(format!("Missing {MANIFEST_PATH} file"));
        }

        let mut seen = HashSet::new();
        for file in &ado.files {
            if !seen.insert(file.path.as_str()) {
                issues.push(format!("Duplicate file path: {}", file.path));
            }
        }

        let mut reported = HashSet::new();
        for component in &ado.components {
            if !seen.contains(component.file_path.as_str())
                && reported.insert(component.file_path.as_str())
            {
                issues.push(format!(
                    "Component file {} not found in files list",
                    component.file_path
                ));
            }
        }

        for (name, _) in framework_dependencies(&ado.framework) {
            if !ado.has_dependency(name) {
                issues.push(format!("Missing required dependency: {name}"));
            }
        }

        issues
    }

    /// Produce an enriched copy of the definition
    ///
    /// Duplicate dependency names collapse to one entry (the last one wins,
    /// kept at the position of the first), then the framework- and
    /// style-implied packages are appended when absent.
    #[must_use]
    pub fn enrich(&self, mut ado: ApplicationDefinition) -> ApplicationDefinition {
        ado.dependencies = dedupe_last_wins(ado.dependencies);

        for (name, version) in framework_dependencies(&ado.framework) {
            if !ado.has_dependency(name) {
                tracing::debug!(dependency = name, "adding framework dependency");
                ado.dependencies.push(Dependency::runtime(*name, *version));
            }
        }

        for (name, version, dev) in style_dependencies(ado.style_config.framework) {
            if !ado.has_dependency(name) {
                tracing::debug!(dependency = name, "adding styling dependency");
                ado.dependencies.push(Dependency {
                    name: (*name).to_string(),
                    version: (*version).to_string(),
                    dev: *dev,
                });
            }
        }

        ado
    }
}

fn dedupe_last_wins(dependencies: Vec<Dependency>) -> Vec<Dependency> {
    let mut position: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<Dependency> = Vec::with_capacity(dependencies.len());

    for dep in dependencies {
        match position.get(&dep.name) {
            Some(&idx) => out[idx] = dep,
            None => {
                position.insert(dep.name.clone(), out.len());
                out.push(dep);
            }
        }
    }

    out
}
