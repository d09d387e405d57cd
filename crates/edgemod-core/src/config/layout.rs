//! Fixed file locations inside a target project and a module workspace

use std::path::{Path, PathBuf};

/// Sentinel file marking a module-capable project root
pub const PROJECT_SENTINEL: &str = "edgeapp.project.json";

/// Version ledger, relative to the project root
pub const VERSION_LEDGER_PATH: &str = ".edge/modules/registry.ts";

/// Directory holding one receipt per installed module
pub const RECEIPTS_DIR: &str = ".edge/modules";

/// Runtime import registry, relative to the project root
pub const RUNTIME_REGISTRY_PATH: &str = "edge-modules/registry.ts";

/// Modules removed with `uninstall`
pub const DISABLED_MODULES_PATH: &str = ".edge/disabled-modules.json";

/// Manifest file names looked up in a module package, in order
pub const MANIFEST_FILE_NAMES: &[&str] = &["edge-module.json", "edge-module.yaml", "edge-module.yml"];

/// `package.json` field pointing at a manifest file
pub const MANIFEST_POINTER_FIELD: &str = "edgeModule";

/// Package globs used when the workspace declares none
pub const DEFAULT_PACKAGE_GLOBS: &[&str] = &["modules/*", "packages/*"];

pub const PNPM_WORKSPACE_FILE: &str = "pnpm-workspace.yaml";
pub const PACKAGE_JSON_FILE: &str = "package.json";

pub const WORKSPACE_ROOT_ENV: &str = "EDGE_MODULE_WORKSPACE_ROOT";
pub const PACKAGE_MANAGER_ENV: &str = "EDGE_PACKAGE_MANAGER";
pub const PROJECT_ROOT_ENV: &str = "EDGE_TARGET_PROJECT_ROOT";

pub const DEFAULT_PACKAGE_MANAGER: &str = "pnpm";

/// Marker name of the version ledger block and the runtime mapping block
pub const REGISTRY_MARKER: &str = "REGISTRY";

/// Marker name of the runtime import block
pub const IMPORTS_MARKER: &str = "IMPORTS";

/// Start comment for a named marker block
pub fn marker_start(name: &str) -> String {
    format!("// EDGE MODULE {name} START")
}

/// End comment for a named marker block
pub fn marker_end(name: &str) -> String {
    format!("// EDGE MODULE {name} END")
}

/// Absolute locations of every engine-owned file in one project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    root: PathBuf,
}

impl ProjectLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn sentinel(&self) -> PathBuf {
        self.root.join(PROJECT_SENTINEL)
    }

    pub fn version_ledger(&self) -> PathBuf {
        self.root.join(VERSION_LEDGER_PATH)
    }

    pub fn runtime_registry(&self) -> PathBuf {
        self.root.join(RUNTIME_REGISTRY_PATH)
    }

    pub fn receipts_dir(&self) -> PathBuf {
        self.root.join(RECEIPTS_DIR)
    }

    pub fn disabled_modules(&self) -> PathBuf {
        self.root.join(DISABLED_MODULES_PATH)
    }

    /// Receipt path for a module, honouring a manifest override
    /// (relative overrides resolve against the project root)
    pub fn receipt_path(&self, module_id: &str, manifest_override: Option<&str>) -> PathBuf {
        match manifest_override {
            Some(path) => self.root.join(path),
            None => self.receipts_dir().join(format!("{module_id}.json")),
        }
    }

    /// Whether the sentinel file is present
    pub fn is_edge_project(&self) -> bool {
        self.sentinel().is_file()
    }
}
