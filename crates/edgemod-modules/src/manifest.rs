//! Module manifest loading and validation
//!
//! Manifests are static JSON or YAML documents. Validation runs the embedded
//! JSON Schema first and then the semantic rules the schema cannot express;
//! every violation from both layers is reported together.

use edgemod_core::config::{MANIFEST_FILE_NAMES, MANIFEST_POINTER_FIELD, PACKAGE_JSON_FILE};
use edgemod_core::schema::{SchemaValidator, MANIFEST_SCHEMA};
use edgemod_core::types::ModuleManifest;
use edgemod_core::utils::is_valid_module_id;
use edgemod_core::{Error, Result};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A manifest together with the file it came from
#[derive(Debug, Clone)]
pub struct LoadedManifest {
    pub manifest: ModuleManifest,
    pub manifest_path: PathBuf,
}

/// Manifest encodings, by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ManifestFormat {
    Json,
    Yaml,
}

impl ManifestFormat {
    fn detect(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("yaml") | Some("yml") => Ok(Self::Yaml),
            _ => Err(Error::UnsupportedManifestFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Find the manifest file of a module package.
///
/// A `package.json` `edgeModule` field takes precedence over the
/// conventional file names.
pub fn locate_manifest(module_root: &Path) -> Option<PathBuf> {
    let package_json = module_root.join(PACKAGE_JSON_FILE);
    if package_json.is_file() {
        match read_manifest_pointer(&package_json) {
            Ok(Some(pointer)) => {
                let path = module_root.join(pointer);
                return path.is_file().then_some(path);
            }
            Ok(None) => {}
            Err(e) => warn!("Ignoring unreadable {}: {}", package_json.display(), e),
        }
    }

    MANIFEST_FILE_NAMES
        .iter()
        .map(|name| module_root.join(name))
        .find(|path| path.is_file())
}

fn read_manifest_pointer(package_json: &Path) -> Result<Option<String>> {
    let pkg: Value = serde_json::from_str(&fs::read_to_string(package_json)?)?;
    Ok(pkg
        .get(MANIFEST_POINTER_FIELD)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string))
}

/// Load and validate the manifest of a module package.
///
/// Returns `Ok(None)` when the directory has no manifest at all.
pub fn load_module_manifest(module_root: &Path) -> Result<Option<LoadedManifest>> {
    let Some(manifest_path) = locate_manifest(module_root) else {
        return Ok(None);
    };
    debug!("Loading manifest {}", manifest_path.display());

    let manifest = load_manifest_file(&manifest_path)?;
    Ok(Some(LoadedManifest {
        manifest,
        manifest_path,
    }))
}

/// Parse and validate a single manifest file
pub fn load_manifest_file(path: &Path) -> Result<ModuleManifest> {
    let format = ManifestFormat::detect(path)?;
    let content = fs::read_to_string(path)?;

    let parsed: std::result::Result<Value, String> = match format {
        ManifestFormat::Json => serde_json::from_str(&content).map_err(|e| e.to_string()),
        ManifestFormat::Yaml => serde_yaml_ng::from_str(&content).map_err(|e| e.to_string()),
    };
    let value = parsed.map_err(|e| Error::manifest_invalid(path, vec![e]))?;

    let errors = validate_manifest_value(&value)?;
    if !errors.is_empty() {
        return Err(Error::manifest_invalid(path, errors));
    }

    serde_json::from_value(value).map_err(|e| Error::manifest_invalid(path, vec![e.to_string()]))
}

/// Every structural and semantic violation in a manifest document
pub fn validate_manifest_value(value: &Value) -> Result<Vec<String>> {
    let mut errors = SchemaValidator::global()?.violations(value, MANIFEST_SCHEMA)?;
    if value.is_object() {
        errors.extend(semantic_violations(value));
    }
    Ok(errors)
}

fn non_empty_str<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn semantic_violations(value: &Value) -> Vec<String> {
    let mut errors = Vec::new();

    if let Some(id) = non_empty_str(value, "id") {
        if !is_valid_module_id(id) {
            errors.push(format!(
                "id must be lowercase alphanumeric with dashes only: {id}"
            ));
        }
    }

    if let Some(version) = non_empty_str(value, "version") {
        if semver::Version::parse(version).is_err() {
            errors.push(format!("version must be a semantic version: {version}"));
        }
    }

    if let Some(runtime) = value.get("runtime").filter(|r| r.is_object()) {
        for key in ["entry", "target"] {
            if runtime.get(key).and_then(Value::as_str) == Some("") {
                errors.push(format!("runtime.{key} must be a non-empty string"));
            }
        }
    }

    for list in ["templates", "files"] {
        let Some(items) = value.get(list).and_then(Value::as_array) else {
            continue;
        };
        for (index, item) in items.iter().enumerate() {
            for key in ["from", "to"] {
                if item.get(key).and_then(Value::as_str) == Some("") {
                    errors.push(format!("{list}[{index}].{key} must be a non-empty string"));
                }
            }
        }
    }

    if let Some(range) = value
        .get("compatibility")
        .and_then(|c| c.get("platform"))
        .and_then(Value::as_str)
    {
        if crate::upgrade::parse_platform_range(range).is_none() {
            errors.push(format!(
                "compatibility.platform must be a semver range: {range}"
            ));
        }
    }

    if let Some(changes) = value.get("breakingChanges").and_then(Value::as_array) {
        for (index, change) in changes.iter().enumerate() {
            if let Some(version) = change.get("version").and_then(Value::as_str) {
                if crate::upgrade::coerce_version(version).is_none() {
                    errors.push(format!(
                        "breakingChanges[{index}].version is not a version: {version}"
                    ));
                }
            }
        }
    }

    errors
}
