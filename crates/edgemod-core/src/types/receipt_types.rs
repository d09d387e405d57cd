//! Installation receipt types
//!
//! A receipt is a JSON snapshot of everything a single install or upgrade did
//! to a project. Receipts are overwritten on every install and never deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use super::manifest_types::{BreakingChange, ModuleManifest};

/// Persisted install receipt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallReceipt {
    pub module_id: String,
    pub version: String,
    pub installed_at: DateTime<Utc>,
    pub manifest: ModuleManifest,
    pub actions: InstallActions,

    /// Present when this install replaced a different recorded version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upgrade: Option<UpgradeRecord>,
}

/// Every step of an install, in execution order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallActions {
    pub dependencies: DependencyActions,
    pub templates: Vec<TemplateAction>,
    pub patches: Vec<PatchAction>,
    pub registry: RegistryUpdate,
    pub runtime_registry: Option<RuntimeRegistryUpdate>,
}

/// Package specifiers handed to the package manager
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyActions {
    pub dependencies: Vec<String>,
    pub dev_dependencies: Vec<String>,
}

impl DependencyActions {
    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty() && self.dev_dependencies.is_empty()
    }
}

/// Outcome of materializing one template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateStatus {
    Copied,
    Overwritten,
    Skipped,
}

impl fmt::Display for TemplateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Copied => write!(f, "copied"),
            Self::Overwritten => write!(f, "overwritten"),
            Self::Skipped => write!(f, "skipped"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateAction {
    pub from: String,
    pub to: String,
    pub status: TemplateStatus,
}

/// Outcome of applying one patch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchStatus {
    Created,
    Updated,
    Inserted,
    Skipped,
}

impl fmt::Display for PatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Updated => write!(f, "updated"),
            Self::Inserted => write!(f, "inserted"),
            Self::Skipped => write!(f, "skipped"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchAction {
    #[serde(rename = "type")]
    pub kind: String,
    pub target: String,
    pub status: PatchStatus,
}

/// Version-ledger entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub id: String,
    pub version: String,
}

/// Result of upserting the version ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryUpdate {
    pub path: PathBuf,
    pub entry: RegistryEntry,
    pub changed: bool,
}

/// Runtime-registry entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeEntry {
    pub id: String,
    pub identifier: String,
    pub import_path: String,
}

/// Result of upserting the runtime registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeRegistryUpdate {
    pub path: PathBuf,
    pub entry: RuntimeEntry,
    pub changed: bool,
}

/// Version transition recorded on upgrade
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeRecord {
    pub from_version: String,
    pub to_version: String,
    #[serde(default)]
    pub breaking_changes: Vec<BreakingChange>,
}

/// A receipt file as found on disk: parsed loosely so the consistency
/// checker can report malformed receipts instead of failing on them.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadedReceipt {
    Parsed { path: PathBuf, data: Value },
    Unreadable { path: PathBuf, error: String },
}

impl LoadedReceipt {
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::Parsed { path, .. } | Self::Unreadable { path, .. } => path,
        }
    }

    /// `moduleId` of a parsed receipt, if it is a non-empty string
    pub fn module_id(&self) -> Option<&str> {
        self.string_field("moduleId")
    }

    /// `version` of a parsed receipt, if it is a string
    pub fn version(&self) -> Option<&str> {
        self.string_field("version")
    }

    fn string_field(&self, key: &str) -> Option<&str> {
        match self {
            Self::Parsed { data, .. } => data
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty()),
            Self::Unreadable { .. } => None,
        }
    }
}

/// Modules removed with `uninstall`, kept outside the receipts directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisabledModules {
    #[serde(default)]
    pub modules: BTreeMap<String, DisabledModule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisabledModule {
    pub version: String,
    pub disabled_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_loaded_receipt_fields() {
        let receipt = LoadedReceipt::Parsed {
            path: PathBuf::from(".edge/modules/m1.json"),
            data: json!({ "moduleId": "m1", "version": "1.0.0" }),
        };
        assert_eq!(receipt.module_id(), Some("m1"));
        assert_eq!(receipt.version(), Some("1.0.0"));

        let empty = LoadedReceipt::Parsed {
            path: PathBuf::from(".edge/modules/x.json"),
            data: json!({ "moduleId": "" }),
        };
        assert_eq!(empty.module_id(), None);

        let broken = LoadedReceipt::Unreadable {
            path: PathBuf::from(".edge/modules/y.json"),
            error: "expected value".into(),
        };
        assert_eq!(broken.module_id(), None);
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_value(TemplateStatus::Overwritten).unwrap(),
            json!("overwritten")
        );
        assert_eq!(
            serde_json::to_value(PatchStatus::Inserted).unwrap(),
            json!("inserted")
        );
    }
}
