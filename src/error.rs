//! Error types for the SDK generator

use thiserror::Error;

/// Result type for generator operations
pub type Result<T> = std::result::Result<T, GeneratorError>;

/// SDK generator errors
#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("Unsupported property shape on '{property}': {reason}")]
    UnsupportedProperty { property: String, reason: String },

    #[error("Unsupported primitive type '{type_name}' on property '{property}'")]
    UnsupportedType { property: String, type_name: String },

    #[error("Property is missing a display name: {0}")]
    MissingName(String),

    #[error("View not found: {identifier}")]
    ViewNotFound { identifier: String },

    #[error("Data model not found: {identifier}")]
    ModelNotFound { identifier: String },

    #[error("No value generator registered for property '{property}' of type '{type_name}'")]
    MissingValueGenerator { property: String, type_name: String },

    #[error("Invalid dependency version '{version}' for '{dependency}': {source}")]
    InvalidDependencyVersion {
        dependency: String,
        version: String,
        source: semver::Error,
    },

    #[error("Template render failed: {0}")]
    Render(#[from] minijinja::Error),

    #[error("Invalid package name: {0}")]
    InvalidPackageName(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] config_crate::ConfigError),
}

impl GeneratorError {
    /// Whether this error is recoverable at the per-view boundary.
    ///
    /// Classification failures poison a single view only; the run skips it
    /// and keeps going. Everything else aborts the whole generation call.
    pub fn is_per_view(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedProperty { .. }
                | Self::UnsupportedType { .. }
                | Self::MissingName(_)
        )
    }
}
