//! Module manifest types (edge-module.json)

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Export name used for a runtime entry when the manifest does not declare one
pub const DEFAULT_RUNTIME_EXPORT: &str = "edgeModule";

/// A module's declaration of everything it installs into a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleManifest {
    /// Module id (lowercase, alphanumeric and dashes)
    pub id: String,

    /// Semantic version
    pub version: String,

    /// Human-readable label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Short description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Admin route the module mounts under
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,

    /// Package dependencies added to the target project
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<ManifestDependencies>,

    /// Files copied into the project
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub templates: Vec<TemplateSpec>,

    /// Alias list for templates, materialized after `templates`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<TemplateSpec>,

    /// Patches applied to existing project files
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub patches: Vec<PatchSpec>,

    /// Runtime entry point wired into the runtime registry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<RuntimeSpec>,

    /// Receipt location override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt: Option<ReceiptSpec>,

    /// Platform compatibility range
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compatibility: Option<Compatibility>,

    /// Breaking changes by version, reported on upgrade
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub breaking_changes: Vec<BreakingChange>,

    /// Fields the installer does not interpret (kept for the receipt snapshot)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ModuleManifest {
    /// Templates in materialization order, with the runtime entry appended
    /// when it is not already declared explicitly.
    pub fn materialized_templates(&self) -> Vec<TemplateSpec> {
        let mut list: Vec<TemplateSpec> = self
            .templates
            .iter()
            .chain(self.files.iter())
            .cloned()
            .collect();

        if let Some(runtime) = &self.runtime {
            let declared = list
                .iter()
                .any(|t| t.from == runtime.entry && t.to == runtime.target);
            if !declared {
                list.push(TemplateSpec {
                    from: runtime.entry.clone(),
                    to: runtime.target.clone(),
                    overwrite: false,
                });
            }
        }

        list
    }

    /// Total number of declared templates (excluding the implicit runtime entry)
    pub fn template_count(&self) -> usize {
        self.templates.len() + self.files.len()
    }
}

/// Dependency declaration: either a list of specs or npm-style maps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ManifestDependencies {
    List(Vec<DependencyEntry>),
    Map(DependencyMap),
}

impl ManifestDependencies {
    /// Count of (runtime, dev) dependencies declared
    pub fn counts(&self) -> (usize, usize) {
        match self {
            Self::List(entries) => {
                let dev = entries
                    .iter()
                    .filter(|e| matches!(e, DependencyEntry::Spec(s) if s.dev))
                    .count();
                (entries.len() - dev, dev)
            }
            Self::Map(map) => (map.dependencies.len(), map.dev_dependencies.len()),
        }
    }
}

/// One entry of the list form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DependencyEntry {
    Name(String),
    Spec(DependencySpec),
}

/// Detailed dependency spec
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencySpec {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub dev: bool,
}

/// Map form: `{dependencies: {...}, devDependencies: {...}}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyMap {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dependencies: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dev_dependencies: BTreeMap<String, String>,
}

/// A file or directory copied from the module into the project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateSpec {
    /// Path relative to the module root
    pub from: String,

    /// Path relative to the project root
    pub to: String,

    /// Replace existing files
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub overwrite: bool,
}

/// Patch kinds the engine knows how to apply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchKind {
    JsonMerge,
    MarkerInsert,
}

impl PatchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::JsonMerge => "json-merge",
            Self::MarkerInsert => "marker-insert",
        }
    }
}

impl fmt::Display for PatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PatchKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json-merge" => Ok(Self::JsonMerge),
            "marker-insert" => Ok(Self::MarkerInsert),
            other => Err(Error::unknown_patch_type(other)),
        }
    }
}

/// Where marker-insert content goes inside the block
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsertPosition {
    /// Immediately after the start marker
    Before,
    /// Immediately before the end marker
    #[default]
    After,
}

/// Declarative patch. The `type` field is kept as a string so unknown kinds
/// surface as patch errors at apply time rather than as parse failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchSpec {
    #[serde(rename = "type")]
    pub kind: String,

    /// Path relative to the project root
    pub target: String,

    /// json-merge: object deep-merged onto the target
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub merge: Map<String, Value>,

    /// json-merge: create the target when absent
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub create_if_missing: bool,

    /// marker-insert: named marker expanded to `// EDGE MODULE <marker> START|END`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_marker: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_marker: Option<String>,

    /// marker-insert: inline content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// marker-insert: module-relative file holding the content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(default)]
    pub insert_position: InsertPosition,
}

impl PatchSpec {
    /// Parsed patch kind
    pub fn patch_kind(&self) -> Result<PatchKind, Error> {
        self.kind.parse()
    }
}

/// Runtime entry declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeSpec {
    /// Path relative to the module root
    pub entry: String,

    /// Path relative to the project root
    pub target: String,

    /// Exported symbol to import from the target
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export: Option<String>,
}

impl RuntimeSpec {
    pub fn export_name(&self) -> &str {
        self.export.as_deref().unwrap_or(DEFAULT_RUNTIME_EXPORT)
    }
}

/// Receipt location override
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Platform compatibility declaration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Compatibility {
    /// Semver range the project's platformVersion must satisfy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
}

/// A breaking change introduced at a given version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakingChange {
    pub version: String,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_entry_appended_once() {
        let manifest: ModuleManifest = serde_json::from_value(serde_json::json!({
            "id": "pep-talk",
            "version": "0.1.0",
            "templates": [{ "from": "templates/a.ts", "to": "edge-modules/a.ts" }],
            "runtime": { "entry": "templates/edge-module.ts", "target": "edge-modules/pep-talk.ts" }
        }))
        .unwrap();

        let list = manifest.materialized_templates();
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].to, "edge-modules/pep-talk.ts");
        assert!(!list[1].overwrite);
    }

    #[test]
    fn test_runtime_entry_not_duplicated_when_declared() {
        let manifest: ModuleManifest = serde_json::from_value(serde_json::json!({
            "id": "pep-talk",
            "version": "0.1.0",
            "files": [{ "from": "rt.ts", "to": "edge-modules/pep-talk.ts", "overwrite": true }],
            "runtime": { "entry": "rt.ts", "target": "edge-modules/pep-talk.ts" }
        }))
        .unwrap();

        let list = manifest.materialized_templates();
        assert_eq!(list.len(), 1);
        assert!(list[0].overwrite);
    }

    #[test]
    fn test_dependency_forms() {
        let list: ManifestDependencies = serde_json::from_value(serde_json::json!([
            "lodash",
            { "name": "zod", "version": "^3.0.0" },
            { "name": "vitest", "dev": true }
        ]))
        .unwrap();
        assert_eq!(list.counts(), (2, 1));

        let map: ManifestDependencies = serde_json::from_value(serde_json::json!({
            "dependencies": { "zod": "^3.0.0" },
            "devDependencies": { "vitest": "" }
        }))
        .unwrap();
        assert_eq!(map.counts(), (1, 1));
    }

    #[test]
    fn test_unknown_patch_kind_is_kept_until_apply() {
        let patch: PatchSpec = serde_json::from_value(serde_json::json!({
            "type": "yaml-merge",
            "target": "config.yaml"
        }))
        .unwrap();
        assert!(matches!(
            patch.patch_kind(),
            Err(Error::UnknownPatchType { kind }) if kind == "yaml-merge"
        ));
    }

    #[test]
    fn test_unrecognised_fields_survive_round_trip() {
        let raw = serde_json::json!({
            "id": "forms",
            "version": "1.0.0",
            "scope": ["tenant", "site"]
        });
        let manifest: ModuleManifest = serde_json::from_value(raw).unwrap();
        let back = serde_json::to_value(&manifest).unwrap();
        assert_eq!(back["scope"], serde_json::json!(["tenant", "site"]));
    }
}
