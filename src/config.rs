//! Configuration for the generator
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (viewgen.toml)
//! - Environment variables (VIEWGEN_*)
//!
//! ## Example config file (viewgen.toml):
//! ```toml
//! [package]
//! name = "example_sdk"
//! version = "0.1.0"
//! pydantic_v2 = true
//!
//! [output]
//! overwrite = true
//!
//! [mock]
//! node_count = 5
//! max_edge_count = 3
//! null_fraction = 0.25
//!
//! [manifest]
//! platform_client = "6.0.0"
//! serialization = "2.0.0"
//! tabular = "1.5.0"
//! ```

use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{GeneratorError, Result};

/// Main configuration for SDK generation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default)]
    pub package: PackageConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub mock: MockDefaults,

    #[serde(default)]
    pub manifest: ManifestVersions,
}

/// Generated-package settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageConfig {
    /// Top-level package name. Dots separate sub-packages; hyphens are
    /// normalized to underscores.
    pub name: String,
    /// Aggregate client class name; derived from the model when absent
    #[serde(default)]
    pub client_name: Option<String>,
    /// Version stamped into the generated distribution
    pub version: String,
    /// Which static core variant to emit
    pub pydantic_v2: bool,
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            name: "example_sdk".to_string(),
            client_name: None,
            version: "0.1.0".to_string(),
            pydantic_v2: true,
        }
    }
}

impl PackageConfig {
    /// The importable (dotted) Python package name
    pub fn python_package(&self) -> String {
        self.name.replace('-', "_")
    }

    /// The package as a relative directory path ("my_sdk.client" ->
    /// "my_sdk/client"), validated segment by segment.
    pub fn package_path(&self) -> Result<String> {
        let package = self.python_package();
        if package.is_empty() {
            return Err(GeneratorError::InvalidPackageName(self.name.clone()));
        }
        for segment in package.split('.') {
            let mut chars = segment.chars();
            let valid_head = chars
                .next()
                .map(|c| c.is_ascii_alphabetic() || c == '_')
                .unwrap_or(false);
            if !valid_head || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(GeneratorError::InvalidPackageName(self.name.clone()));
            }
        }
        Ok(package.replace('.', "/"))
    }
}

/// Disk-writer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Overwrite existing files; skip them when false
    pub overwrite: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { overwrite: true }
    }
}

/// Defaults for the mock-data pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockDefaults {
    /// Nodes synthesized per view
    pub node_count: usize,
    /// Upper bound of one-to-many edges per node
    pub max_edge_count: usize,
    /// Fraction of nullable values replaced with null
    pub null_fraction: f64,
    /// Sample edge targets with replacement
    pub allow_edge_reuse: bool,
    /// Random seed; identical seeds reproduce identical batches
    pub seed: u64,
}

impl Default for MockDefaults {
    fn default() -> Self {
        Self {
            node_count: 5,
            max_edge_count: 3,
            null_fraction: 0.25,
            allow_edge_reuse: false,
            seed: 42,
        }
    }
}

/// Lower-bound versions of the three runtime dependencies declared by the
/// generated distribution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestVersions {
    /// Remote-platform client
    pub platform_client: String,
    /// Serialization/validation library
    pub serialization: String,
    /// Tabular-data library
    pub tabular: String,
}

impl Default for ManifestVersions {
    fn default() -> Self {
        Self {
            platform_client: "6.0.0".to_string(),
            serialization: "2.0.0".to_string(),
            tabular: "1.5.0".to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Load configuration with layering: defaults, then viewgen.toml,
    /// then VIEWGEN_* environment variables.
    pub fn load() -> Result<Self> {
        let config = Config::builder()
            .add_source(File::with_name("viewgen").required(false))
            .add_source(Environment::with_prefix("VIEWGEN").separator("__"))
            .build()?;
        let mut loaded: Self = config.try_deserialize().unwrap_or_default();
        if loaded.package.name.is_empty() {
            loaded.package = PackageConfig::default();
        }
        Ok(loaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_path_conversion() {
        let mut package = PackageConfig::default();
        package.name = "my-sdk.client".to_string();
        assert_eq!(package.python_package(), "my_sdk.client");
        assert_eq!(package.package_path().unwrap(), "my_sdk/client");
    }

    #[test]
    fn test_invalid_package_names() {
        for bad in ["", "1sdk", "my sdk", "a..b", "a.1b"] {
            let mut package = PackageConfig::default();
            package.name = bad.to_string();
            assert!(package.package_path().is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::default();
        assert_eq!(config.package.name, "example_sdk");
        assert!(config.package.pydantic_v2);
        assert_eq!(config.mock.node_count, 5);
    }
}
