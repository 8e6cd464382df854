//! Prompt templates for the oracle
//!
//! Placeholders are `{name}` tokens filled by [`PromptBuilder`]. Free text
//! from the user is substituted last so it cannot inject placeholders.

use ado_schema::{
    ApplicationDefinition, ComponentKind, FileSlot, FileType, GenerationRequest, StyleFramework,
};

/// Full directive: complete target shape with every enum list
pub const FULL_DIRECTIVE_PROMPT: &str = r#"Create a complete Application Definition Object (ADO) for the following request.

Prompt: "{prompt}"
Framework: {framework}
Style Framework: {style}
Additional Requirements: {requirements}

You must return ONLY a valid JSON object with this exact structure (no markdown, no explanations):

{
    "name": "my-app",
    "description": "Brief description",
    "framework": "{framework}",
    "files": [
        {
            "path": "package.json",
            "type": "json",
            "content": "",
            "description": "Package configuration"
        },
        {
            "path": "src/App.jsx",
            "type": "jsx",
            "content": "",
            "description": "Main app component",
            "component": "App"
        }
    ],
    "components": [
        {
            "name": "App",
            "type": "functional",
            "file_path": "src/App.jsx",
            "props": [
                {
                    "name": "title",
                    "type": "string",
                    "required": false,
                    "default_value": "My App",
                    "description": "Application title"
                }
            ],
            "imports": ["react"],
            "exports": ["default"],
            "description": "Main application component"
        }
    ],
    "dependencies": [
        {"name": "react", "version": "^18.2.0", "dev": false},
        {"name": "tailwindcss", "version": "^3.3.0", "dev": true}
    ],
    "style_config": {
        "framework": "{style}",
        "theme": {},
        "custom_css": null
    }
}

CRITICAL RULES:
1. Return ONLY the JSON object - no markdown blocks, no explanations
2. Use double quotes for all strings
3. Component props MUST be objects with name, type, required, default_value, description fields
4. Style framework MUST be one of: {style_values}
5. File types MUST be: {file_types}
6. Component types MUST be: {component_types}
7. Keep file content empty (will be generated separately)
8. Ensure all JSON is valid and properly formatted

JSON Response:"#;

/// Simplified directive: minimal example, used after a malformed reply
pub const SIMPLIFIED_DIRECTIVE_PROMPT: &str = r#"Generate a simple JSON for a {framework} app: "{prompt}"

Return only this JSON structure:
{
    "name": "simple-app",
    "description": "Simple app description",
    "framework": "{framework}",
    "files": [
        {"path": "package.json", "type": "json", "content": "", "description": "Package file"},
        {"path": "src/App.jsx", "type": "jsx", "content": "", "description": "Main component"}
    ],
    "components": [
        {"name": "App", "type": "functional", "file_path": "src/App.jsx", "props": [], "imports": ["react"], "exports": ["default"], "description": "Main component"}
    ],
    "dependencies": [
        {"name": "react", "version": "^18.2.0", "dev": false}
    ],
    "style_config": {"framework": "{style}", "theme": {}, "custom_css": null}
}"#;

/// Content of one file slot
pub const FILE_CONTENT_PROMPT: &str = r#"Generate complete code for file: {path}

File type: {file_type}
Description: {description}

Application context:
- Name: {name}
- Framework: {framework}
- Style framework: {style}

Component info: {component}

Available components: {components}

Dependencies: {dependencies}

Rules:
1. Generate complete, functional code
2. Use {style} for styling
3. Include all necessary imports
4. Follow modern best practices
5. Make it responsive and accessible
6. No placeholder comments

Return only the file content."#;

/// Change request against an existing definition
pub const MODIFICATION_PROMPT: &str = r#"Modify the following Application Definition Object based on the user's request:

Current ADO:
{current}

User Request: "{instruction}"

Files to modify: {targets}
Preserve structure: {preserve}

Return the complete modified ADO as JSON with the same structure.

Rules:
1. Only modify what the user requested
2. Maintain existing component relationships
3. Update dependencies only if new features require them
4. Preserve existing styling framework unless explicitly changed
5. Keep file structure consistent

Return only the JSON object."#;

const NOT_AVAILABLE: &str = "N/A";

/// Assembles prompts from the templates
pub struct PromptBuilder;

impl PromptBuilder {
    /// Full directive for a generation request
    #[must_use]
    pub fn full_directive(request: &GenerationRequest) -> String {
        FULL_DIRECTIVE_PROMPT
            .replace(
                "{style_values}",
                &quoted_list(StyleFramework::ALL.iter().map(|s| s.as_str())),
            )
            .replace(
                "{file_types}",
                &quoted_list(FileType::ALL.iter().map(|t| t.as_str())),
            )
            .replace(
                "{component_types}",
                &quoted_list(ComponentKind::ALL.iter().map(|k| k.as_str())),
            )
            .replace("{framework}", &request.framework)
            .replace("{style}", request.style_framework.as_str())
            .replace("{requirements}", &request.additional_requirements.join("; "))
            .replace("{prompt}", &request.prompt)
    }

    /// Simplified directive for a generation request
    #[must_use]
    pub fn simplified_directive(request: &GenerationRequest) -> String {
        SIMPLIFIED_DIRECTIVE_PROMPT
            .replace("{framework}", &request.framework)
            .replace("{style}", request.style_framework.as_str())
            .replace("{prompt}", &request.prompt)
    }

    /// Prompt for the content of `slot` in the context of `ado`
    #[must_use]
    pub fn file_content(slot: &FileSlot, ado: &ApplicationDefinition) -> String {
        let component = slot
            .component
            .as_deref()
            .and_then(|name| ado.component(name))
            .and_then(|spec| serde_json::to_string(spec).ok())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());

        FILE_CONTENT_PROMPT
            .replace("{file_type}", slot.file_type.as_str())
            .replace("{style}", ado.style_config.framework.as_str())
            .replace("{components}", &bracket_list(ado.component_names()))
            .replace("{dependencies}", &bracket_list(ado.dependency_names()))
            .replace("{framework}", &ado.framework)
            .replace("{name}", &ado.name)
            .replace("{component}", &component)
            .replace(
                "{description}",
                slot.description.as_deref().unwrap_or(NOT_AVAILABLE),
            )
            .replace("{path}", &slot.path)
    }

    /// Prompt for a change request
    #[must_use]
    pub fn modification(
        current_json: &str,
        instruction: &str,
        targets: &[String],
        preserve_structure: bool,
    ) -> String {
        let targets = if targets.is_empty() {
            "Auto-detect".to_string()
        } else {
            targets.join(", ")
        };

        MODIFICATION_PROMPT
            .replace("{targets}", &targets)
            .replace("{preserve}", if preserve_structure { "yes" } else { "no" })
            .replace("{current}", current_json)
            .replace("{instruction}", instruction)
    }
}

fn quoted_list<'a>(values: impl Iterator<Item = &'a str>) -> String {
    values
        .map(|v| format!("\"{v}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

fn bracket_list(values: Vec<&str>) -> String {
    format!("[{}]", values.join(", "))
}
