//! Distribution manifest
//!
//! Renders the pyproject manifest for the generated file tree. Exactly
//! three runtime dependencies are declared with pinned lower bounds: the
//! remote-platform client, the serialization/validation library, and the
//! tabular-data library. The bounds come from configuration and are
//! validated as semantic versions before rendering.

use semver::Version;

use crate::config::GeneratorConfig;
use crate::error::{GeneratorError, Result};
use crate::schema::DataModel;

use super::templates::{ManifestBinding, TemplateEngine, MANIFEST_TEMPLATE};

/// Render the pyproject.toml text for one generated SDK
pub fn render_manifest(
    engine: &TemplateEngine,
    config: &GeneratorConfig,
    model: &DataModel,
) -> Result<String> {
    let versions = &config.manifest;
    let platform_client_version = checked("platform_client", &versions.platform_client)?;
    let serialization_version = checked("serialization", &versions.serialization)?;
    let tabular_version = checked("tabular", &versions.tabular)?;

    let top_level_package = config.package.python_package();
    let package_name = distribution_name(&top_level_package);
    let binding = ManifestBinding {
        package_name: &package_name,
        package_version: &config.package.version,
        top_level_package: &top_level_package,
        model_external_id: &model.external_id,
        platform_client_version,
        serialization_version,
        tabular_version,
    };
    engine.render(MANIFEST_TEMPLATE, &binding)
}

/// Distribution names use hyphens where package names use underscores/dots
fn distribution_name(python_package: &str) -> String {
    python_package.replace(['_', '.'], "-")
}

fn checked(dependency: &str, version: &str) -> Result<String> {
    Version::parse(version)
        .map(|v| v.to_string())
        .map_err(|source| GeneratorError::InvalidDependencyVersion {
            dependency: dependency.to_string(),
            version: version.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;

    fn model() -> DataModel {
        DataModel {
            space: "films".into(),
            external_id: "MovieModel".into(),
            version: "1".into(),
            views: vec![],
        }
    }

    #[test]
    fn test_manifest_declares_three_dependencies() {
        let engine = TemplateEngine::new();
        let text = render_manifest(&engine, &GeneratorConfig::default(), &model()).unwrap();
        assert!(text.contains("cognite-sdk>=6.0.0"));
        assert!(text.contains("pydantic>=2.0.0"));
        assert!(text.contains("pandas>=1.5.0"));
        assert!(text.contains("name = \"example-sdk\""));
    }

    #[test]
    fn test_bad_version_is_rejected() {
        let engine = TemplateEngine::new();
        let mut config = GeneratorConfig::default();
        config.manifest.serialization = "not-a-version".to_string();
        let err = render_manifest(&engine, &config, &model()).unwrap_err();
        assert!(matches!(
            err,
            GeneratorError::InvalidDependencyVersion { .. }
        ));
    }
}
