//! Shared utility functions for edgemod crates

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use crate::error::Result;

static MODULE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9-]*$").expect("module id regex is valid"));

/// Whether `id` is a well-formed module id (lowercase alphanumerics and dashes)
pub fn is_valid_module_id(id: &str) -> bool {
    MODULE_ID.is_match(id)
}

fn id_parts(module_id: &str) -> Vec<&str> {
    module_id
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|p| !p.is_empty())
        .collect()
}

fn capitalize(part: &str) -> String {
    let mut chars = part.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Import identifier for a module in the runtime registry.
///
/// `pep-talk` becomes `pepTalkModule`; ids already ending in "module" keep
/// their name (`edge-module` becomes `edgeModule`).
pub fn to_module_identifier(module_id: &str) -> String {
    let parts = id_parts(module_id);
    let Some((first, rest)) = parts.split_first() else {
        return "edgeModule".to_string();
    };

    let mut base = first.to_lowercase();
    for part in rest {
        base.push_str(&capitalize(part));
    }

    if base.to_lowercase().ends_with("module") {
        base
    } else {
        format!("{base}Module")
    }
}

/// Human-readable label: `pep-talk` becomes `Pep Talk`
pub fn to_module_label(module_id: &str) -> String {
    let parts = id_parts(module_id);
    if parts.is_empty() {
        return "Module".to_string();
    }
    parts
        .iter()
        .map(|p| capitalize(p))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn to_pascal_case(module_id: &str) -> String {
    let parts = id_parts(module_id);
    if parts.is_empty() {
        return "Module".to_string();
    }
    parts.iter().map(|p| capitalize(p)).collect()
}

pub fn to_camel_case(module_id: &str) -> String {
    let pascal = to_pascal_case(module_id);
    let mut chars = pascal.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Render a path with forward slashes
pub fn to_posix(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Resolve `.` and `..` components without touching the filesystem
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut parts: Vec<Component> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            _ => parts.push(component),
        }
    }
    if parts.is_empty() {
        return PathBuf::from(".");
    }
    parts.into_iter().collect()
}

/// Absolute, normalized form of `path` (relative paths resolve against the
/// current directory)
pub fn resolve_absolute_path(path: &Path) -> Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    Ok(normalize_path(&absolute))
}

/// Lexical path from directory `from` to `to`. Both must be absolute or both
/// relative to the same base.
pub fn relative_path(from: &Path, to: &Path) -> PathBuf {
    let from = normalize_path(from);
    let to = normalize_path(to);
    let from_parts: Vec<Component> = from.components().collect();
    let to_parts: Vec<Component> = to.components().collect();

    let common = from_parts
        .iter()
        .zip(to_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut result = PathBuf::new();
    for _ in common..from_parts.len() {
        result.push("..");
    }
    for part in &to_parts[common..] {
        result.push(part.as_os_str());
    }
    result
}

/// Recursively rebuild every object in `value` with its keys in ascending order
pub fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let sorted: Map<String, Value> =
                entries.into_iter().map(|(k, v)| (k, sort_keys(v))).collect();
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

/// Key-sorted, 2-space pretty JSON with a trailing newline
pub fn to_sorted_json<T: Serialize>(value: &T) -> Result<String> {
    let value = sort_keys(serde_json::to_value(value)?);
    let mut out = serde_json::to_string_pretty(&value)?;
    out.push('\n');
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_module_identifier() {
        assert_eq!(to_module_identifier("pep-talk"), "pepTalkModule");
        assert_eq!(to_module_identifier("forms"), "formsModule");
        assert_eq!(to_module_identifier("edge-module"), "edgeModule");
        assert_eq!(to_module_identifier("Big_Data"), "bigDataModule");
        assert_eq!(to_module_identifier("---"), "edgeModule");
        assert_eq!(to_module_identifier("analytics-sub-module"), "analyticsSubModule");
    }

    #[test]
    fn test_labels_and_cases() {
        assert_eq!(to_module_label("pep-talk"), "Pep Talk");
        assert_eq!(to_pascal_case("pep-talk"), "PepTalk");
        assert_eq!(to_camel_case("pep-talk"), "pepTalk");
        assert_eq!(to_pascal_case(""), "Module");
        assert_eq!(to_camel_case(""), "module");
    }

    #[test]
    fn test_module_id_pattern() {
        assert!(is_valid_module_id("pep-talk"));
        assert!(is_valid_module_id("a1"));
        assert!(!is_valid_module_id("-lead"));
        assert!(!is_valid_module_id("Upper"));
        assert!(!is_valid_module_id("with_underscore"));
        assert!(!is_valid_module_id(""));
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path(Path::new("/a/b/../c/./d")),
            PathBuf::from("/a/c/d")
        );
        assert_eq!(normalize_path(Path::new("/..")), PathBuf::from("/"));
        assert_eq!(normalize_path(Path::new("../x")), PathBuf::from("../x"));
    }

    #[test]
    fn test_relative_path() {
        assert_eq!(
            relative_path(
                Path::new("/proj/edge-modules"),
                Path::new("/proj/edge-modules/pep-talk.ts")
            ),
            PathBuf::from("pep-talk.ts")
        );
        assert_eq!(
            relative_path(
                Path::new("/proj/edge-modules"),
                Path::new("/proj/src/modules/forms/index.ts")
            ),
            PathBuf::from("../src/modules/forms/index.ts")
        );
    }

    #[test]
    fn test_sorted_json_is_deterministic() {
        let value = json!({ "b": 1, "a": { "z": true, "c": [ { "y": 1, "x": 2 } ] } });
        let out = to_sorted_json(&value).unwrap();
        assert!(out.ends_with("}\n"));
        let a = out.find("\"a\"").unwrap();
        let b = out.find("\"b\"").unwrap();
        assert!(a < b);
        let x = out.find("\"x\"").unwrap();
        let y = out.find("\"y\"").unwrap();
        assert!(x < y);
    }
}
