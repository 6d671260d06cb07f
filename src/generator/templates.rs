//! Template engine boundary
//!
//! The renderer is a black box behind `render(template_name, bindings)`.
//! Template names are fixed strings, one per artifact kind, and every
//! binding is an explicit `Serialize` struct, so a missing or renamed key is
//! a compile error in this crate, not a blank substitution at render time.

use minijinja::Environment;
use serde::Serialize;

use crate::classify::Field;
use crate::error::Result;

pub const DATA_CLASS_TEMPLATE: &str = "data_class.py.jinja";
pub const API_CLASS_TEMPLATE: &str = "api_class.py.jinja";
pub const CLIENT_TEMPLATE: &str = "client.py.jinja";
pub const DATA_CLASSES_INIT_TEMPLATE: &str = "data_classes_init.py.jinja";
pub const CORE_TEMPLATE: &str = "core.py.jinja";
pub const API_CORE_TEMPLATE: &str = "api_core.py.jinja";
pub const MANIFEST_TEMPLATE: &str = "pyproject.toml.jinja";

/// Wrapper around the embedded template set
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    pub fn new() -> Self {
        let mut env = Environment::new();
        // Embedded at compile time; adding a template cannot fail for
        // distinct static names.
        env.add_template(
            DATA_CLASS_TEMPLATE,
            include_str!("../../templates/data_class.py.jinja"),
        )
        .expect("embedded template");
        env.add_template(
            API_CLASS_TEMPLATE,
            include_str!("../../templates/api_class.py.jinja"),
        )
        .expect("embedded template");
        env.add_template(
            CLIENT_TEMPLATE,
            include_str!("../../templates/client.py.jinja"),
        )
        .expect("embedded template");
        env.add_template(
            DATA_CLASSES_INIT_TEMPLATE,
            include_str!("../../templates/data_classes_init.py.jinja"),
        )
        .expect("embedded template");
        env.add_template(CORE_TEMPLATE, include_str!("../../templates/core.py.jinja"))
            .expect("embedded template");
        env.add_template(
            API_CORE_TEMPLATE,
            include_str!("../../templates/api_core.py.jinja"),
        )
        .expect("embedded template");
        env.add_template(
            MANIFEST_TEMPLATE,
            include_str!("../../templates/pyproject.toml.jinja"),
        )
        .expect("embedded template");
        Self { env }
    }

    /// Render one template with its typed bindings. Output is always
    /// newline-terminated.
    pub fn render<S: Serialize>(&self, template_name: &str, bindings: &S) -> Result<String> {
        let template = self.env.get_template(template_name)?;
        let mut text = template.render(bindings)?;
        if !text.ends_with('\n') {
            text.push('\n');
        }
        Ok(text)
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Bindings (one struct per template)
// =============================================================================

/// Imported dependency of a data-class module
#[derive(Debug, Clone, Serialize)]
pub struct DependencyBinding {
    pub class_name: String,
    pub write_class: String,
    pub file_name: String,
}

/// Bindings for `data_class.py.jinja`
#[derive(Debug, Serialize)]
pub struct DataClassBinding<'a> {
    pub top_level_package: &'a str,
    pub class_name: &'a str,
    pub write_class: String,
    pub list_class: &'a str,
    pub file_name: &'a str,
    pub source_space: &'a str,
    pub source_external_id: &'a str,
    pub source_version: &'a str,
    /// Required fields first, then defaulted, alphabetical within each
    pub fields: Vec<&'a Field>,
    pub dependencies: Vec<DependencyBinding>,
}

/// One edge sub-API of a view
#[derive(Debug, Clone, Serialize)]
pub struct EdgeApiBinding {
    /// PascalCase suffix composed into the sub-API class name
    pub api_suffix: String,
    /// Attribute the sub-API hangs off ("persons")
    pub attribute: String,
    pub target_class: String,
    pub target_file: String,
}

/// Bindings for `api_class.py.jinja`
#[derive(Debug, Serialize)]
pub struct ApiClassBinding<'a> {
    pub top_level_package: &'a str,
    pub api_class: &'a str,
    pub class_name: &'a str,
    pub write_class: String,
    pub list_class: &'a str,
    pub file_name: &'a str,
    pub source_space: &'a str,
    pub source_external_id: &'a str,
    pub edge_apis: Vec<EdgeApiBinding>,
}

/// One per-view API referenced by the aggregate client
#[derive(Debug, Clone, Serialize)]
pub struct ClientApiBinding {
    pub api_class: String,
    pub api_attribute: String,
    pub file_name: String,
}

/// Bindings for `client.py.jinja`
#[derive(Debug, Serialize)]
pub struct ClientBinding<'a> {
    pub top_level_package: &'a str,
    pub client_name: &'a str,
    pub model_space: &'a str,
    pub model_external_id: &'a str,
    pub model_version: &'a str,
    pub first_api_attribute: String,
    pub apis: Vec<ClientApiBinding>,
}

/// One module re-exported by the data-classes init
#[derive(Debug, Clone, Serialize)]
pub struct InitModuleBinding {
    pub file_name: String,
    pub data_class: String,
    pub write_class: String,
    pub list_class: String,
}

/// Bindings for `data_classes_init.py.jinja`
#[derive(Debug, Serialize)]
pub struct DataClassesInitBinding<'a> {
    pub top_level_package: &'a str,
    /// Dependency order: dependencies before dependents
    pub modules: Vec<InitModuleBinding>,
}

/// Bindings for `core.py.jinja` and `api_core.py.jinja`
#[derive(Debug, Serialize)]
pub struct CoreBinding<'a> {
    pub top_level_package: &'a str,
    /// Selects the serialization-library variant of the static core
    pub pydantic_v2: bool,
}

/// Bindings for `pyproject.toml.jinja`
#[derive(Debug, Serialize)]
pub struct ManifestBinding<'a> {
    pub package_name: &'a str,
    pub package_version: &'a str,
    pub top_level_package: &'a str,
    pub model_external_id: &'a str,
    pub platform_client_version: String,
    pub serialization_version: String,
    pub tabular_version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_renders_core() {
        let engine = TemplateEngine::new();
        let text = engine
            .render(
                CORE_TEMPLATE,
                &CoreBinding {
                    top_level_package: "example_sdk",
                    pydantic_v2: true,
                },
            )
            .unwrap();
        assert!(text.contains("ConfigDict"));
        assert!(text.ends_with('\n'));

        let text = engine
            .render(
                CORE_TEMPLATE,
                &CoreBinding {
                    top_level_package: "example_sdk",
                    pydantic_v2: false,
                },
            )
            .unwrap();
        assert!(text.contains("allow_population_by_field_name"));
    }
}
