//! JSON Schema validation for module manifests

use crate::error::{Error, Result};
use jsonschema::Validator;
use rust_embed::RustEmbed;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::debug;

/// Name of the module manifest schema
pub const MANIFEST_SCHEMA: &str = "edge-module";

/// Embedded schema files
#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/schemas/"]
#[prefix = ""]
struct EmbeddedSchemas;

/// Schema validator with pre-compiled schemas
#[derive(Debug)]
pub struct SchemaValidator {
    /// Compiled schemas by name
    schemas: HashMap<String, Validator>,
}

/// Global schema validator instance
static VALIDATOR: OnceLock<std::result::Result<SchemaValidator, String>> = OnceLock::new();

impl SchemaValidator {
    /// Create a new schema validator with embedded schemas
    pub fn new() -> Result<Self> {
        let mut schemas = HashMap::new();

        for file in EmbeddedSchemas::iter() {
            if !file.ends_with(".schema.json") {
                continue;
            }
            let name = file.trim_end_matches(".schema.json").to_string();
            debug!("Loading embedded schema: {}", name);

            if let Some(content) = EmbeddedSchemas::get(&file) {
                let json_str = std::str::from_utf8(&content.data).map_err(|_| {
                    Error::invalid_config(format!("Invalid UTF-8 in schema: {}", file))
                })?;
                let schema_value: Value = serde_json::from_str(json_str)?;
                let compiled = Self::compile(&name, &schema_value)?;
                schemas.insert(name, compiled);
            }
        }

        if schemas.is_empty() {
            return Err(Error::schema_not_found(MANIFEST_SCHEMA));
        }

        Ok(Self { schemas })
    }

    /// Get the global validator instance
    pub fn global() -> Result<&'static SchemaValidator> {
        VALIDATOR
            .get_or_init(|| SchemaValidator::new().map_err(|e| e.to_string()))
            .as_ref()
            .map_err(|e| Error::invalid_config(format!("Schema initialization failed: {}", e)))
    }

    fn compile(name: &str, schema: &Value) -> Result<Validator> {
        jsonschema::validator_for(schema).map_err(|e| {
            Error::invalid_config(format!("Failed to compile schema {}: {}", name, e))
        })
    }

    /// Collect every violation of `value` against the named schema.
    ///
    /// Each entry is prefixed with the JSON pointer of the offending
    /// instance when it is not the document root.
    pub fn violations(&self, value: &Value, schema_name: &str) -> Result<Vec<String>> {
        let schema = self
            .schemas
            .get(schema_name)
            .ok_or_else(|| Error::schema_not_found(schema_name))?;

        Ok(schema
            .iter_errors(value)
            .map(|e| {
                let path = e.instance_path().to_string();
                if path.is_empty() {
                    e.to_string()
                } else {
                    format!("{}: {}", path, e)
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_embedded_manifest_schema_loads() {
        let validator = SchemaValidator::new().unwrap();
        assert!(validator.schemas.contains_key(MANIFEST_SCHEMA));
    }

    #[test]
    fn test_minimal_manifest_is_valid() {
        let validator = SchemaValidator::global().unwrap();
        let manifest = json!({ "id": "pep-talk", "version": "0.1.0" });
        assert!(validator.violations(&manifest, MANIFEST_SCHEMA).unwrap().is_empty());
    }

    #[test]
    fn test_every_violation_is_reported() {
        let validator = SchemaValidator::global().unwrap();
        let manifest = json!({
            "version": 3,
            "templates": [{ "from": "a" }],
            "patches": "nope"
        });
        let errors = validator.violations(&manifest, MANIFEST_SCHEMA).unwrap();
        // missing id, non-string version, template without `to`, patches not an array
        assert!(errors.len() >= 4, "{errors:?}");
        assert!(errors.iter().any(|e| e.starts_with("/templates/0")));
        assert!(errors.iter().any(|e| e.starts_with("/patches")));
    }

    #[test]
    fn test_unknown_schema_name() {
        let validator = SchemaValidator::global().unwrap();
        let err = validator.violations(&json!({}), "nope").unwrap_err();
        assert!(matches!(err, Error::SchemaNotFound { .. }));
    }
}
