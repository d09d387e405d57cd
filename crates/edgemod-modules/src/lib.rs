//! Module installer engine for edgemod
//!
//! This crate handles:
//! - Workspace discovery and manifest loading
//! - Template materialization with token substitution
//! - `json-merge` and `marker-insert` patches
//! - The version ledger and the runtime registry
//! - Dependency installs through the package manager
//! - Install receipts, upgrades and uninstalls
//! - Scaffolding new module packages

pub mod dependency;
pub mod installer;
pub mod ledger;
pub mod manifest;
pub mod markers;
pub mod patch;
pub mod receipt;
pub mod runtime_registry;
pub mod scaffold;
pub mod templates;
pub mod upgrade;
pub mod workspace;

pub use dependency::{DuctRunner, PackageManagerRunner};
pub use installer::{
    install_module, is_edge_project, uninstall_module, InstallOptions, InstallOutcome,
    ModuleInstaller, UninstallOutcome,
};
pub use ledger::VersionLedger;
pub use manifest::{load_module_manifest, LoadedManifest};
pub use receipt::load_receipts;
pub use runtime_registry::RuntimeRegistry;
pub use scaffold::{create_module_package, CreateModuleOptions, CreatedModule};
pub use workspace::{
    discover_module_packages, get_workspace_root, resolve_module_by_id, ModulePackageEntry,
};
