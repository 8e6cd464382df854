//! Application Definition Object (ADO) data model
//!
//! The ADO is the structured description of a generated project:
//! - File slots (path, type, content pending synthesis)
//! - Components and their props
//! - Routes, state definitions and API endpoints
//! - Dependencies and styling configuration
//!
//! Every type here is a plain serde value. The model is strict: decoding
//! a loosely-shaped oracle reply must go through the repair step first.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::{self, Display, Formatter};
use std::path::Path;
use std::str::FromStr;

/// Opaque key/value mapping carried through untouched
pub type Passthrough = Map<String, Value>;

/// Name of the root manifest file every project must declare
pub const MANIFEST_PATH: &str = "package.json";

fn default_version() -> String {
    "1.0.0".to_string()
}

fn default_framework() -> String {
    "react".to_string()
}

fn default_true() -> bool {
    true
}

/// Complete Application Definition Object
///
/// Treated as an immutable snapshot once it leaves the synthesizer:
/// modification produces a new value, it never mutates in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationDefinition {
    /// Project name
    pub name: String,
    /// Project version
    #[serde(default = "default_version")]
    pub version: String,
    /// Short description
    #[serde(default)]
    pub description: Option<String>,
    /// Free-form framework tag (e.g. "react")
    #[serde(default = "default_framework")]
    pub framework: String,
    /// Ordered file slots; `path` is the unique key
    #[serde(default)]
    pub files: Vec<FileSlot>,
    /// Component specifications
    #[serde(default)]
    pub components: Vec<ComponentSpec>,
    /// Client-side routes
    #[serde(default)]
    pub routes: Vec<RouteSpec>,
    /// Package dependencies, logically keyed by name
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
    /// Styling configuration
    #[serde(default)]
    pub style_config: StyleConfig,
    /// Application state definitions
    #[serde(default)]
    pub state_definitions: Vec<StateSpec>,
    /// API endpoints (full-stack projects)
    #[serde(default)]
    pub api_endpoints: Vec<ApiEndpoint>,
    /// Build configuration (passthrough)
    #[serde(default)]
    pub build_config: Passthrough,
    /// Generation metadata (passthrough)
    #[serde(default)]
    pub generation_metadata: Passthrough,
}

impl ApplicationDefinition {
    /// Create an empty definition with defaults for everything but the name
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: default_version(),
            description: None,
            framework: default_framework(),
            files: Vec::new(),
            components: Vec::new(),
            routes: Vec::new(),
            dependencies: Vec::new(),
            style_config: StyleConfig::default(),
            state_definitions: Vec::new(),
            api_endpoints: Vec::new(),
            build_config: Passthrough::new(),
            generation_metadata: Passthrough::new(),
        }
    }

    /// With description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// With framework tag
    #[must_use]
    pub fn with_framework(mut self, framework: impl Into<String>) -> Self {
        self.framework = framework.into();
        self
    }

    /// With styling framework
    #[must_use]
    pub fn with_style(mut self, framework: StyleFramework) -> Self {
        self.style_config.framework = framework;
        self
    }

    /// Append a file slot
    #[must_use]
    pub fn with_file(mut self, file: FileSlot) -> Self {
        self.files.push(file);
        self
    }

    /// Append a component
    #[must_use]
    pub fn with_component(mut self, component: ComponentSpec) -> Self {
        self.components.push(component);
        self
    }

    /// Append a dependency
    #[must_use]
    pub fn with_dependency(mut self, dependency: Dependency) -> Self {
        self.dependencies.push(dependency);
        self
    }

    /// Look up a file slot by path
    #[must_use]
    pub fn file(&self, path: &str) -> Option<&FileSlot> {
        self.files.iter().find(|f| f.path == path)
    }

    /// Look up a component by name
    #[must_use]
    pub fn component(&self, name: &str) -> Option<&ComponentSpec> {
        self.components.iter().find(|c| c.name == name)
    }

    /// Whether a dependency with this name is declared
    #[must_use]
    pub fn has_dependency(&self, name: &str) -> bool {
        self.dependencies.iter().any(|d| d.name == name)
    }

    /// File paths in declared order
    #[must_use]
    pub fn file_paths(&self) -> Vec<String> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }

    /// Component names in declared order
    #[must_use]
    pub fn component_names(&self) -> Vec<&str> {
        self.components.iter().map(|c| c.name.as_str()).collect()
    }

    /// Dependency names in declared order
    #[must_use]
    pub fn dependency_names(&self) -> Vec<&str> {
        self.dependencies.iter().map(|d| d.name.as_str()).collect()
    }
}

/// A single file in the project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileSlot {
    /// Project-relative path, unique within the definition
    pub path: String,
    /// Declared file type
    #[serde(rename = "type")]
    pub file_type: FileType,
    /// File content; empty until synthesized
    #[serde(default)]
    pub content: String,
    /// Human-readable purpose of the file
    #[serde(default)]
    pub description: Option<String>,
    /// Name of the component this file holds, if any
    #[serde(default)]
    pub component: Option<String>,
}

impl FileSlot {
    /// Create an empty slot, inferring the type from the path suffix
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            file_type: FileType::from_path(&path),
            path,
            content: String::new(),
            description: None,
            component: None,
        }
    }

    /// With explicit file type
    #[must_use]
    pub fn with_type(mut self, file_type: FileType) -> Self {
        self.file_type = file_type;
        self
    }

    /// With description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// With pre-filled content
    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// With owning component
    #[must_use]
    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }

    /// Whether content is still pending synthesis
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// Supported file types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// JavaScript
    Js,
    /// TypeScript
    Ts,
    /// JavaScript with JSX
    Jsx,
    /// TypeScript with JSX
    Tsx,
    /// Plain stylesheet
    Css,
    /// Sass stylesheet
    Scss,
    /// JSON document
    Json,
    /// HTML document
    Html,
    /// Markdown document
    Md,
}

impl FileType {
    /// Every canonical file type
    pub const ALL: [FileType; 9] = [
        FileType::Js,
        FileType::Ts,
        FileType::Jsx,
        FileType::Tsx,
        FileType::Css,
        FileType::Scss,
        FileType::Json,
        FileType::Html,
        FileType::Md,
    ];

    /// Canonical spelling
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            FileType::Js => "js",
            FileType::Ts => "ts",
            FileType::Jsx => "jsx",
            FileType::Tsx => "tsx",
            FileType::Css => "css",
            FileType::Scss => "scss",
            FileType::Json => "json",
            FileType::Html => "html",
            FileType::Md => "md",
        }
    }

    /// Map a bare extension (no dot) to a file type
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "js" | "mjs" | "cjs" => Some(FileType::Js),
            "ts" | "mts" | "cts" => Some(FileType::Ts),
            "jsx" => Some(FileType::Jsx),
            "tsx" => Some(FileType::Tsx),
            "css" => Some(FileType::Css),
            "scss" => Some(FileType::Scss),
            "json" => Some(FileType::Json),
            "html" | "htm" => Some(FileType::Html),
            "md" | "markdown" => Some(FileType::Md),
            _ => None,
        }
    }

    /// Infer the type from a path suffix
    ///
    /// Unrecognized or missing suffixes fall back to [`FileType::Js`], the
    /// generic script type.
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
            .unwrap_or(FileType::Js)
    }

    /// Whether files of this type conventionally hold a UI component
    #[must_use]
    pub const fn is_component_source(self) -> bool {
        matches!(self, FileType::Jsx | FileType::Tsx)
    }
}

impl Display for FileType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownVariant::new("file type", s))
    }
}

/// Supported component kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    /// Function component (default)
    #[default]
    Functional,
    /// Class component
    Class,
    /// Routed page
    Page,
    /// Layout wrapper
    Layout,
    /// Reusable hook
    Hook,
    /// Non-visual helper
    Utility,
}

impl ComponentKind {
    /// Every canonical component kind
    pub const ALL: [ComponentKind; 6] = [
        ComponentKind::Functional,
        ComponentKind::Class,
        ComponentKind::Page,
        ComponentKind::Layout,
        ComponentKind::Hook,
        ComponentKind::Utility,
    ];

    /// Canonical spelling
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ComponentKind::Functional => "functional",
            ComponentKind::Class => "class",
            ComponentKind::Page => "page",
            ComponentKind::Layout => "layout",
            ComponentKind::Hook => "hook",
            ComponentKind::Utility => "utility",
        }
    }
}

impl Display for ComponentKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComponentKind {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| UnknownVariant::new("component type", s))
    }
}

/// Supported styling frameworks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StyleFramework {
    /// Tailwind CSS (default)
    #[default]
    #[serde(rename = "tailwindcss")]
    Tailwind,
    /// styled-components
    #[serde(rename = "styled-components")]
    StyledComponents,
    /// Emotion
    #[serde(rename = "emotion")]
    Emotion,
    /// CSS modules
    #[serde(rename = "css-modules")]
    CssModules,
    /// Plain stylesheets
    #[serde(rename = "css", alias = "vanilla-css")]
    VanillaCss,
}

impl StyleFramework {
    /// Every canonical styling framework
    pub const ALL: [StyleFramework; 5] = [
        StyleFramework::Tailwind,
        StyleFramework::StyledComponents,
        StyleFramework::Emotion,
        StyleFramework::CssModules,
        StyleFramework::VanillaCss,
    ];

    /// Canonical spelling
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            StyleFramework::Tailwind => "tailwindcss",
            StyleFramework::StyledComponents => "styled-components",
            StyleFramework::Emotion => "emotion",
            StyleFramework::CssModules => "css-modules",
            StyleFramework::VanillaCss => "css",
        }
    }
}

impl Display for StyleFramework {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StyleFramework {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "vanilla-css" {
            return Ok(StyleFramework::VanillaCss);
        }
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| UnknownVariant::new("style framework", s))
    }
}

/// Error for a string that is not a canonical enum spelling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
}

impl UnknownVariant {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

impl Display for UnknownVariant {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {}: '{}'", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

/// Component prop definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropSpec {
    /// Prop name
    pub name: String,
    /// Prop type ("string", "number", "boolean", ...)
    #[serde(rename = "type")]
    pub prop_type: String,
    /// Whether callers must pass it
    #[serde(default)]
    pub required: bool,
    /// Default value
    #[serde(default)]
    pub default_value: Option<Value>,
    /// Human-readable description
    #[serde(default)]
    pub description: Option<String>,
}

/// Component definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentSpec {
    /// Component name
    pub name: String,
    /// Component kind
    #[serde(rename = "type")]
    pub kind: ComponentKind,
    /// Path of the file slot holding the component
    pub file_path: String,
    /// Props
    #[serde(default)]
    pub props: Vec<PropSpec>,
    /// Imported modules
    #[serde(default)]
    pub imports: Vec<String>,
    /// Exported names
    #[serde(default)]
    pub exports: Vec<String>,
    /// Human-readable description
    #[serde(default)]
    pub description: Option<String>,
    /// Names of other components this one renders
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl ComponentSpec {
    /// Create a functional component living in `file_path`
    #[must_use]
    pub fn new(name: impl Into<String>, file_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ComponentKind::Functional,
            file_path: file_path.into(),
            props: Vec::new(),
            imports: Vec::new(),
            exports: Vec::new(),
            description: None,
            dependencies: Vec::new(),
        }
    }
}

/// Route definition for single-page apps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSpec {
    /// URL path
    pub path: String,
    /// Component rendered for the route
    pub component: String,
    /// Exact match
    #[serde(default = "default_true")]
    pub exact: bool,
    /// Requires authentication in the generated app
    #[serde(default)]
    pub protected: bool,
    /// Free-form route metadata
    #[serde(default)]
    pub meta: Passthrough,
}

/// Application state definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSpec {
    /// State name
    pub name: String,
    /// Storage kind ("local", "context", "redux", ...)
    #[serde(rename = "type")]
    pub kind: String,
    /// Initial value
    #[serde(default)]
    pub initial_value: Value,
    /// Action names
    #[serde(default)]
    pub actions: Vec<String>,
}

/// API endpoint definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEndpoint {
    /// Endpoint path
    pub path: String,
    /// HTTP method
    pub method: String,
    /// Human-readable description
    #[serde(default)]
    pub description: Option<String>,
    /// Request body schema
    #[serde(default)]
    pub request_schema: Option<Passthrough>,
    /// Response body schema
    #[serde(default)]
    pub response_schema: Option<Passthrough>,
}

/// Package dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// Package name (logical key)
    pub name: String,
    /// Version requirement
    pub version: String,
    /// Development-only dependency
    #[serde(default)]
    pub dev: bool,
}

impl Dependency {
    /// Runtime dependency
    #[must_use]
    pub fn runtime(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            dev: false,
        }
    }

    /// Development dependency
    #[must_use]
    pub fn dev(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            dev: true,
        }
    }
}

/// Styling configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StyleConfig {
    /// Styling framework
    #[serde(default)]
    pub framework: StyleFramework,
    /// Theme tokens (passthrough)
    #[serde(default)]
    pub theme: Passthrough,
    /// Extra stylesheet text
    #[serde(default)]
    pub custom_css: Option<String>,
}
