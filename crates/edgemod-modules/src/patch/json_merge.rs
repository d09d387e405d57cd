//! `json-merge` patches

use edgemod_core::types::{PatchSpec, PatchStatus};
use edgemod_core::utils::to_sorted_json;
use edgemod_core::{Error, Result};
use serde_json::{Map, Value};
use std::fs;
use tracing::debug;

use super::PatchContext;

/// Deep merge JSON values (source takes precedence).
///
/// Objects merge key by key; anything else in `source`, arrays included,
/// replaces the destination value.
pub fn merge_json_values(dest: &mut Value, source: Value) {
    match (dest, source) {
        (Value::Object(dest_map), Value::Object(source_map)) => {
            for (key, value) in source_map {
                match dest_map.get_mut(&key) {
                    Some(dest_value) => merge_json_values(dest_value, value),
                    None => {
                        dest_map.insert(key, value);
                    }
                }
            }
        }
        (dest_value, source_value) => {
            *dest_value = source_value;
        }
    }
}

/// Merge `patch.merge` into the target document and write it back with keys
/// sorted. Reports `skipped` when the result is byte-identical.
pub fn apply_json_merge(ctx: &PatchContext<'_>, patch: &PatchSpec) -> Result<PatchStatus> {
    let target_path = ctx.project_root.join(&patch.target);

    let (mut current, existing, mut status) = if target_path.is_file() {
        let raw = fs::read_to_string(&target_path)?;
        let current = if raw.trim().is_empty() {
            Value::Object(Map::new())
        } else {
            serde_json::from_str(&raw)?
        };
        if !current.is_object() {
            return Err(Error::MergeTargetNotObject {
                target: patch.target.clone(),
            });
        }
        (current, Some(raw), PatchStatus::Updated)
    } else if patch.create_if_missing {
        (Value::Object(Map::new()), None, PatchStatus::Created)
    } else {
        return Err(Error::patch_target_missing("JSON merge", &patch.target));
    };

    merge_json_values(&mut current, Value::Object(patch.merge.clone()));
    let rendered = to_sorted_json(&current)?;

    if existing.as_deref() == Some(rendered.as_str()) {
        status = PatchStatus::Skipped;
    } else if !ctx.dry_run {
        if let Some(parent) = target_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target_path, rendered)?;
        debug!("Wrote merged JSON to {}", target_path.display());
    }

    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn merge_patch(target: &str, merge: Value, create: bool) -> PatchSpec {
        serde_json::from_value(json!({
            "type": "json-merge",
            "target": target,
            "merge": merge,
            "createIfMissing": create
        }))
        .unwrap()
    }

    #[test]
    fn test_merge_json_values_arrays_replace() {
        let mut dest = json!({ "a": { "b": 1 }, "c": [1, 2] });
        merge_json_values(&mut dest, json!({ "a": { "d": 2 }, "c": [3] }));
        assert_eq!(dest, json!({ "a": { "b": 1, "d": 2 }, "c": [3] }));
    }

    #[test]
    fn test_merge_json_values_object_replaces_scalar() {
        let mut dest = json!({ "a": "text" });
        merge_json_values(&mut dest, json!({ "a": { "nested": true } }));
        assert_eq!(dest, json!({ "a": { "nested": true } }));
    }

    #[test]
    fn test_missing_target_without_create() {
        let temp = TempDir::new().unwrap();
        let ctx = PatchContext {
            module_root: temp.path(),
            project_root: temp.path(),
            dry_run: false,
        };
        let err = apply_json_merge(&ctx, &merge_patch("config.json", json!({}), false)).unwrap_err();
        assert_eq!(err.to_string(), "JSON merge target missing: config.json");
    }

    #[test]
    fn test_created_then_skipped() {
        let temp = TempDir::new().unwrap();
        let ctx = PatchContext {
            module_root: temp.path(),
            project_root: temp.path(),
            dry_run: false,
        };
        let patch = merge_patch("config/edge.json", json!({ "z": 1, "a": { "y": 2, "b": 3 } }), true);

        assert_eq!(apply_json_merge(&ctx, &patch).unwrap(), PatchStatus::Created);
        let written = fs::read_to_string(temp.path().join("config/edge.json")).unwrap();
        assert_eq!(
            written,
            "{\n  \"a\": {\n    \"b\": 3,\n    \"y\": 2\n  },\n  \"z\": 1\n}\n"
        );

        assert_eq!(apply_json_merge(&ctx, &patch).unwrap(), PatchStatus::Skipped);
    }

    #[test]
    fn test_empty_target_treated_as_object() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("c.json"), "  \n").unwrap();
        let ctx = PatchContext {
            module_root: temp.path(),
            project_root: temp.path(),
            dry_run: false,
        };
        let status = apply_json_merge(&ctx, &merge_patch("c.json", json!({ "k": true }), false)).unwrap();
        assert_eq!(status, PatchStatus::Updated);
    }

    #[test]
    fn test_non_object_target_is_rejected() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("list.json"), "[1, 2]").unwrap();
        let ctx = PatchContext {
            module_root: temp.path(),
            project_root: temp.path(),
            dry_run: false,
        };
        let err = apply_json_merge(&ctx, &merge_patch("list.json", json!({ "k": 1 }), false)).unwrap_err();
        assert!(matches!(err, Error::MergeTargetNotObject { .. }));
    }

    #[test]
    fn test_dry_run_does_not_write() {
        let temp = TempDir::new().unwrap();
        let ctx = PatchContext {
            module_root: temp.path(),
            project_root: temp.path(),
            dry_run: true,
        };
        let status = apply_json_merge(&ctx, &merge_patch("new.json", json!({ "k": 1 }), true)).unwrap();
        assert_eq!(status, PatchStatus::Created);
        assert!(!temp.path().join("new.json").exists());
    }
}
