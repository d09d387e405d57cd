//! Install and uninstall orchestration
//!
//! An install runs its steps strictly in order: dependencies, templates,
//! patches, version ledger, runtime registry, receipt. Every step is
//! idempotent, so re-running an install converges on the same project state.
//! Nothing is rolled back when a step fails.

use chrono::Utc;
use edgemod_core::config::{InstallerSettings, ProjectConfig, ProjectLayout};
use edgemod_core::types::{
    InstallActions, InstallReceipt, LoadedReceipt, RegistryUpdate, UpgradeRecord,
};
use edgemod_core::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::dependency::{install_dependencies, DuctRunner, PackageManagerRunner};
use crate::ledger::VersionLedger;
use crate::patch::{apply_patches, PatchContext};
use crate::receipt::{clear_disabled, find_receipt, mark_disabled, read_receipt, write_receipt};
use crate::runtime_registry::RuntimeRegistry;
use crate::templates::{TemplateMaterializer, TokenSet};
use crate::upgrade::{check_compatibility, upgrade_record};
use crate::workspace::{get_workspace_root, resolve_module_by_id, ModulePackageEntry};

/// Per-call install options
#[derive(Debug, Clone, Copy, Default)]
pub struct InstallOptions {
    /// Compute every step's outcome without running the package manager or
    /// writing any file
    pub dry_run: bool,
}

/// Result of one install or upgrade
#[derive(Debug, Clone)]
pub struct InstallOutcome {
    pub module: ModulePackageEntry,
    /// Where the receipt was (or, in a dry run, would be) written
    pub receipt_path: PathBuf,
    pub receipt: InstallReceipt,
    pub dry_run: bool,
}

impl InstallOutcome {
    pub fn actions(&self) -> &InstallActions {
        &self.receipt.actions
    }

    pub fn registry(&self) -> &RegistryUpdate {
        &self.receipt.actions.registry
    }

    pub fn upgrade(&self) -> Option<&UpgradeRecord> {
        self.receipt.upgrade.as_ref()
    }
}

/// Result of one uninstall
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UninstallOutcome {
    pub module_id: String,
    /// Version recorded by the receipt that was kept
    pub version: String,
    pub receipt_path: PathBuf,
    pub registry_changed: bool,
    pub runtime_registry_changed: bool,
    pub dry_run: bool,
}

/// Installs workspace modules into one target project
pub struct ModuleInstaller {
    project_root: PathBuf,
    workspace_root: PathBuf,
    runner: Box<dyn PackageManagerRunner>,
}

impl ModuleInstaller {
    /// Installer using the default package manager
    pub fn new(project_root: impl Into<PathBuf>, workspace_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            workspace_root: workspace_root.into(),
            runner: Box::new(DuctRunner::new(
                edgemod_core::config::DEFAULT_PACKAGE_MANAGER,
            )),
        }
    }

    /// Installer configured from resolved settings
    pub fn from_settings(settings: &InstallerSettings) -> Result<Self> {
        let workspace_root =
            get_workspace_root(&settings.project_root, settings.workspace_root.as_deref())?;
        Ok(Self::new(&settings.project_root, workspace_root)
            .with_runner(DuctRunner::new(&settings.package_manager)))
    }

    /// Replace the package-manager runner
    pub fn with_runner(mut self, runner: impl PackageManagerRunner + 'static) -> Self {
        self.runner = Box::new(runner);
        self
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    pub fn layout(&self) -> ProjectLayout {
        ProjectLayout::new(&self.project_root)
    }

    fn require_project(&self) -> Result<ProjectConfig> {
        ProjectConfig::load(&self.project_root)
    }

    /// Install or upgrade a module. Both go through the same path; an
    /// upgrade is an install over a receipt recording a different version.
    pub fn install(&self, module_id: &str, options: InstallOptions) -> Result<InstallOutcome> {
        let dry_run = options.dry_run;
        let project = self.require_project()?;
        let layout = self.layout();

        let module = resolve_module_by_id(&self.workspace_root, module_id)?
            .ok_or_else(|| Error::module_not_found(module_id))?;
        let manifest = &module.manifest;

        check_compatibility(manifest, project.platform_version.as_deref())?;

        let receipt_path = layout.receipt_path(
            &manifest.id,
            manifest.receipt.as_ref().and_then(|r| r.path.as_deref()),
        );
        let upgrade = read_receipt(&receipt_path)
            .and_then(|previous| upgrade_record(manifest, &previous.version));

        info!(
            "{} {} {}",
            if dry_run { "Planning install of" } else { "Installing" },
            manifest.id,
            manifest.version
        );

        let dependencies = install_dependencies(
            self.runner.as_ref(),
            &self.project_root,
            manifest.dependencies.as_ref(),
            dry_run,
        )?;

        let tokens = TokenSet::for_manifest(manifest);
        let templates = TemplateMaterializer::new(&module.module_root, &self.project_root, &tokens)
            .dry_run(dry_run)
            .materialize_all(&manifest.materialized_templates())?;

        let patch_ctx = PatchContext {
            module_root: &module.module_root,
            project_root: &self.project_root,
            dry_run,
        };
        let patches = apply_patches(&patch_ctx, &manifest.patches)?;

        let registry =
            VersionLedger::for_project(&layout).upsert(&manifest.id, &manifest.version, dry_run)?;
        let runtime_registry =
            RuntimeRegistry::for_project(&layout).upsert(&self.project_root, manifest, dry_run)?;

        let receipt = InstallReceipt {
            module_id: manifest.id.clone(),
            version: manifest.version.clone(),
            installed_at: Utc::now(),
            manifest: manifest.clone(),
            actions: InstallActions {
                dependencies,
                templates,
                patches,
                registry,
                runtime_registry,
            },
            upgrade,
        };
        write_receipt(&receipt_path, &receipt, dry_run)?;

        if clear_disabled(&layout, &manifest.id, dry_run)? {
            debug!("Re-enabled {}", manifest.id);
        }

        if !dry_run {
            info!("Installed {} {}", manifest.id, manifest.version);
        }

        Ok(InstallOutcome {
            module,
            receipt_path,
            receipt,
            dry_run,
        })
    }

    /// Unregister an installed module and mark it disabled. The receipt,
    /// templates and patches stay in place.
    pub fn uninstall(&self, module_id: &str, options: InstallOptions) -> Result<UninstallOutcome> {
        let dry_run = options.dry_run;
        self.require_project()?;
        let layout = self.layout();

        let receipt = match find_receipt(&self.project_root, module_id)? {
            Some(receipt) => receipt,
            None => self
                .overridden_receipt(module_id)
                .ok_or_else(|| Error::module_not_installed(module_id))?,
        };
        let version = receipt.version().unwrap_or_default().to_string();

        let registry_changed = VersionLedger::for_project(&layout).remove(module_id, dry_run)?;
        let runtime_registry_changed =
            RuntimeRegistry::for_project(&layout).remove(module_id, dry_run)?;
        mark_disabled(&layout, module_id, &version, dry_run)?;

        info!(
            "{} {} {} (receipt kept)",
            if dry_run { "Would remove" } else { "Removed" },
            module_id,
            version
        );

        Ok(UninstallOutcome {
            module_id: module_id.to_string(),
            version,
            receipt_path: receipt.path().clone(),
            registry_changed,
            runtime_registry_changed,
            dry_run,
        })
    }

    /// Receipt written to a manifest-declared path outside the receipts
    /// directory, when the module is still resolvable
    fn overridden_receipt(&self, module_id: &str) -> Option<LoadedReceipt> {
        let module = match resolve_module_by_id(&self.workspace_root, module_id) {
            Ok(module) => module?,
            Err(e) => {
                warn!("Could not resolve {} in workspace: {}", module_id, e);
                return None;
            }
        };
        let path = module.manifest.receipt.as_ref()?.path.as_deref()?;
        let path = self.layout().receipt_path(module_id, Some(path));
        let receipt = read_receipt(&path)?;
        Some(LoadedReceipt::Parsed {
            path,
            data: serde_json::to_value(&receipt).ok()?,
        })
    }
}

/// Whether `project_root` carries the project sentinel file
pub fn is_edge_project(project_root: &Path) -> bool {
    ProjectLayout::new(project_root).is_edge_project()
}

/// Install a module using settings resolved for `project_root`
pub fn install_module(
    project_root: &Path,
    workspace_root: &Path,
    module_id: &str,
) -> Result<InstallOutcome> {
    let settings = InstallerSettings::for_project(project_root)?;
    ModuleInstaller::new(&settings.project_root, workspace_root)
        .with_runner(DuctRunner::new(&settings.package_manager))
        .install(module_id, InstallOptions::default())
}

/// Uninstall a module from `project_root`
pub fn uninstall_module(
    project_root: &Path,
    workspace_root: &Path,
    module_id: &str,
) -> Result<UninstallOutcome> {
    ModuleInstaller::new(project_root, workspace_root)
        .uninstall(module_id, InstallOptions::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use edgemod_core::config::PROJECT_SENTINEL;
    use std::fs;
    use tempfile::TempDir;

    struct NoopRunner;

    impl PackageManagerRunner for NoopRunner {
        fn add(&self, _: &Path, _: &[String], _: bool) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_install_requires_sentinel() {
        let temp = TempDir::new().unwrap();
        let installer = ModuleInstaller::new(temp.path(), temp.path()).with_runner(NoopRunner);
        let err = installer.install("forms", InstallOptions::default()).unwrap_err();
        assert!(matches!(err, Error::NotAnEdgeProject { .. }));
        assert!(err.is_precondition());
        assert!(!temp.path().join(".edge").exists());
    }

    #[test]
    fn test_unknown_module() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(PROJECT_SENTINEL), "{}").unwrap();
        let installer = ModuleInstaller::new(temp.path(), temp.path()).with_runner(NoopRunner);
        let err = installer.install("forms", InstallOptions::default()).unwrap_err();
        assert_eq!(err.to_string(), "Module not found: forms");
    }

    #[test]
    fn test_uninstall_requires_receipt() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(PROJECT_SENTINEL), "{}").unwrap();
        let err = uninstall_module(temp.path(), temp.path(), "forms").unwrap_err();
        assert!(matches!(err, Error::ModuleNotInstalled { .. }));
    }

    #[test]
    fn test_is_edge_project() {
        let temp = TempDir::new().unwrap();
        assert!(!is_edge_project(temp.path()));
        fs::write(temp.path().join(PROJECT_SENTINEL), "").unwrap();
        assert!(is_edge_project(temp.path()));
    }
}
