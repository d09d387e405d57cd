//! Project consistency checks
//!
//! Reads the sentinel, the version ledger, the runtime registry, the receipts
//! and the disabled-module list, and reports drift between them as leveled
//! issues. Nothing is modified.

use edgemod_core::config::{
    ProjectLayout, PROJECT_SENTINEL, RUNTIME_REGISTRY_PATH, VERSION_LEDGER_PATH,
};
use edgemod_core::types::{DisabledModules, LoadedReceipt};
use edgemod_modules::receipt::{load_receipts, read_disabled};
use edgemod_modules::VersionLedger;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Severity of a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueLevel {
    Warn,
    Error,
}

impl fmt::Display for IssueLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// One finding with an optional remedy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub level: IssueLevel,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Issue {
    pub fn error(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self {
            level: IssueLevel::Error,
            message: message.into(),
            suggestion: Some(suggestion.into()),
        }
    }

    pub fn warn(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self {
            level: IssueLevel::Warn,
            message: message.into(),
            suggestion: Some(suggestion.into()),
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Runs every consistency check against one project
pub struct ProjectChecker {
    layout: ProjectLayout,
}

impl ProjectChecker {
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            layout: ProjectLayout::new(project_root.as_ref()),
        }
    }

    /// Every finding, in check order
    pub fn check(&self) -> Vec<Issue> {
        let mut issues = Vec::new();

        self.check_sentinel(&mut issues);
        let ledger = self.read_ledger(&mut issues);
        self.check_runtime_registry(&mut issues);
        let receipts = self.read_receipts(&mut issues);
        let disabled = self.read_disabled(&mut issues);

        for (id, version) in &ledger {
            match receipts.get(id) {
                None => issues.push(Issue::error(
                    format!("Registry entry missing receipt: {id}."),
                    "Re-install the module or remove the registry entry.",
                )),
                Some(receipt_version) if receipt_version.as_deref() != Some(version.as_str()) => {
                    issues.push(Issue::warn(
                        format!("Registry version mismatch for {id}."),
                        "Re-install the module to sync versions.",
                    ))
                }
                Some(_) => {}
            }
            if disabled.modules.contains_key(id) {
                issues.push(Issue::warn(
                    format!("Disabled module still registered: {id}."),
                    format!("Run edgemod module remove {id} again or re-install the module."),
                ));
            }
        }

        for id in receipts.keys() {
            if !ledger.contains_key(id) && !disabled.modules.contains_key(id) {
                issues.push(Issue::warn(
                    format!("Receipt missing registry entry: {id}."),
                    "Run edgemod module add <moduleId> to restore the registry.",
                ));
            }
        }

        debug!(
            "Checked {}: {} ledger entr(ies), {} receipt(s), {} issue(s)",
            self.layout.root().display(),
            ledger.len(),
            receipts.len(),
            issues.len()
        );
        issues
    }

    fn check_sentinel(&self, issues: &mut Vec<Issue>) {
        if !self.layout.is_edge_project() {
            issues.push(Issue::error(
                format!("Missing sentinel file {PROJECT_SENTINEL}."),
                "Create edgeapp.project.json or re-run the edge project initializer.",
            ));
        }
    }

    fn read_ledger(&self, issues: &mut Vec<Issue>) -> BTreeMap<String, String> {
        let ledger = VersionLedger::for_project(&self.layout);
        if !ledger.exists() {
            issues.push(Issue::error(
                format!("Registry file missing: {VERSION_LEDGER_PATH}."),
                "Run edgemod module add <moduleId> to recreate the registry.",
            ));
            return BTreeMap::new();
        }

        match ledger.read_versions() {
            Ok(versions) => versions,
            Err(e) => {
                debug!("Ledger unreadable: {}", e);
                issues.push(Issue::error(
                    format!("Registry file invalid: {VERSION_LEDGER_PATH}."),
                    "Restore the registry markers or re-run edgemod module add for installed modules.",
                ));
                BTreeMap::new()
            }
        }
    }

    fn check_runtime_registry(&self, issues: &mut Vec<Issue>) {
        if !self.layout.runtime_registry().is_file() {
            issues.push(Issue::warn(
                format!("Runtime registry file missing: {RUNTIME_REGISTRY_PATH}."),
                "Re-install a module or add edge-modules/registry.ts to the project.",
            ));
        }
    }

    /// Recorded version (if any) by module id
    fn read_receipts(&self, issues: &mut Vec<Issue>) -> BTreeMap<String, Option<String>> {
        let receipts = match load_receipts(self.layout.root()) {
            Ok(receipts) => receipts,
            Err(e) => {
                issues.push(Issue::error(
                    format!("Receipts directory unreadable: {e}."),
                    "Check permissions on .edge/modules.",
                ));
                return BTreeMap::new();
            }
        };

        let mut by_id = BTreeMap::new();
        for receipt in receipts {
            let name = file_name(receipt.path());
            if matches!(receipt, LoadedReceipt::Unreadable { .. }) {
                issues.push(Issue::error(
                    format!("Receipt is unreadable: {name}."),
                    "Delete the bad receipt and re-install the module.",
                ));
                continue;
            }
            let Some(id) = receipt.module_id() else {
                issues.push(Issue::error(
                    format!("Receipt missing moduleId: {name}."),
                    "Delete the receipt and re-install the module.",
                ));
                continue;
            };
            by_id.insert(id.to_string(), receipt.version().map(str::to_string));
        }
        by_id
    }

    fn read_disabled(&self, issues: &mut Vec<Issue>) -> DisabledModules {
        read_disabled(&self.layout).unwrap_or_else(|e| {
            issues.push(Issue::warn(
                format!("Disabled module list unreadable: {e}."),
                "Delete .edge/disabled-modules.json; removed modules will be reported again.",
            ));
            DisabledModules::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_empty_directory() {
        let temp = TempDir::new().unwrap();
        let issues = ProjectChecker::new(temp.path()).check();
        let messages: Vec<&str> = issues.iter().map(|i| i.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "Missing sentinel file edgeapp.project.json.",
                "Registry file missing: .edge/modules/registry.ts.",
                "Runtime registry file missing: edge-modules/registry.ts.",
            ]
        );
        assert_eq!(issues[2].level, IssueLevel::Warn);
    }

    #[test]
    fn test_receipt_without_module_id() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".edge/modules");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("orphan.json"), r#"{"version": "1.0.0"}"#).unwrap();
        fs::write(dir.join("broken.json"), "{").unwrap();

        let issues = ProjectChecker::new(temp.path()).check();
        assert!(issues
            .iter()
            .any(|i| i.message == "Receipt missing moduleId: orphan.json."));
        assert!(issues
            .iter()
            .any(|i| i.message == "Receipt is unreadable: broken.json." && i.level == IssueLevel::Error));
    }

    #[test]
    fn test_issue_serializes_lowercase_level() {
        let issue = Issue::warn("m", "s");
        assert_eq!(
            serde_json::to_value(&issue).unwrap(),
            serde_json::json!({ "level": "warn", "message": "m", "suggestion": "s" })
        );
    }
}
