//! Error types for edgemod-core

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias using edgemod-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared by the installer engine and the consistency checker
#[derive(Error, Debug)]
pub enum Error {
    /// The project root does not carry the sentinel file
    #[error("Missing sentinel file {sentinel} in {}. This does not look like an Edge app project.", .root.display())]
    NotAnEdgeProject { root: PathBuf, sentinel: String },

    /// No workspace package declares the requested module id
    #[error("Module not found: {id}")]
    ModuleNotFound { id: String },

    /// A module id was requested for an operation that needs it installed
    #[error("Module is not installed: {id} (no receipt found)")]
    ModuleNotInstalled { id: String },

    /// Two workspace packages declare the same module id
    #[error("Duplicate module id '{id}' declared by {} and {}", .first.display(), .second.display())]
    DuplicateModuleId {
        id: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// Manifest failed validation (every violation is listed)
    #[error("Invalid manifest at {}:\n- {}", .path.display(), .errors.join("\n- "))]
    ManifestInvalid { path: PathBuf, errors: Vec<String> },

    /// Manifest uses an encoding the loader does not accept
    #[error("Unsupported manifest format: {} (manifests must be static JSON or YAML)", .path.display())]
    UnsupportedManifestFormat { path: PathBuf },

    /// Module manifest is incompatible with the project's platform version
    #[error("Module {id} requires platform {range}, project is on {platform_version}")]
    IncompatiblePlatform {
        id: String,
        range: String,
        platform_version: String,
    },

    /// Template source file or directory is missing from the module
    #[error("Template source missing: {}", .path.display())]
    TemplateSourceMissing { path: PathBuf },

    /// Patch declares a type the engine does not know
    #[error("Unknown patch type: {kind}")]
    UnknownPatchType { kind: String },

    /// Patch target file does not exist
    #[error("{kind} target missing: {target}")]
    PatchTargetMissing { kind: String, target: String },

    /// Marker-insert patch has no marker declaration
    #[error("Marker insert patch missing marker or start/end markers for {target}")]
    PatchMarkersUndeclared { target: String },

    /// Marker-insert patch has neither inline content nor a source file
    #[error("Marker insert content missing for {target}")]
    PatchContentMissing { target: String },

    /// Target file does not contain the expected marker pair
    #[error("Markers not found in {target}: {start} / {end}")]
    MarkersNotFound {
        target: String,
        start: String,
        end: String,
    },

    /// A JSON merge target exists but is not a JSON object
    #[error("JSON merge target is not an object: {target}")]
    MergeTargetNotObject { target: String },

    /// Package-manager invocation exited non-zero
    #[error("{command} failed.")]
    DependencyInstallFailed { command: String },

    /// Scaffolding target already exists
    #[error("Target directory already exists: {}", .path.display())]
    TargetExists { path: PathBuf },

    /// Invalid module id supplied by a caller
    #[error("Module id must be lowercase alphanumeric with dashes only: {id}")]
    InvalidModuleId { id: String },

    /// Invalid configuration format
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Schema not found
    #[error("Schema not found: {name}")]
    SchemaNotFound { name: String },

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a missing-sentinel error
    pub fn not_an_edge_project(root: impl AsRef<Path>, sentinel: impl Into<String>) -> Self {
        Self::NotAnEdgeProject {
            root: root.as_ref().to_path_buf(),
            sentinel: sentinel.into(),
        }
    }

    /// Create a module not found error
    pub fn module_not_found(id: impl Into<String>) -> Self {
        Self::ModuleNotFound { id: id.into() }
    }

    /// Create a module not installed error
    pub fn module_not_installed(id: impl Into<String>) -> Self {
        Self::ModuleNotInstalled { id: id.into() }
    }

    /// Create a manifest validation error from a list of violations
    pub fn manifest_invalid(path: impl AsRef<Path>, errors: Vec<String>) -> Self {
        Self::ManifestInvalid {
            path: path.as_ref().to_path_buf(),
            errors,
        }
    }

    /// Create an unknown patch type error
    pub fn unknown_patch_type(kind: impl Into<String>) -> Self {
        Self::UnknownPatchType { kind: kind.into() }
    }

    /// Create a patch target missing error
    pub fn patch_target_missing(kind: impl Into<String>, target: impl Into<String>) -> Self {
        Self::PatchTargetMissing {
            kind: kind.into(),
            target: target.into(),
        }
    }

    /// Create a markers not found error
    pub fn markers_not_found(
        target: impl Into<String>,
        start: impl Into<String>,
        end: impl Into<String>,
    ) -> Self {
        Self::MarkersNotFound {
            target: target.into(),
            start: start.into(),
            end: end.into(),
        }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a schema not found error
    pub fn schema_not_found(name: impl Into<String>) -> Self {
        Self::SchemaNotFound { name: name.into() }
    }

    /// Whether the error was raised before the engine touched the project
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::NotAnEdgeProject { .. }
                | Self::ModuleNotFound { .. }
                | Self::ModuleNotInstalled { .. }
                | Self::DuplicateModuleId { .. }
                | Self::ManifestInvalid { .. }
                | Self::UnsupportedManifestFormat { .. }
                | Self::IncompatiblePlatform { .. }
        )
    }
}
