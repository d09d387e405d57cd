//! Dependency installer
//!
//! Normalises manifest dependency declarations into package specifiers and
//! hands them to the project's package manager.

use edgemod_core::types::{DependencyActions, DependencyEntry, ManifestDependencies};
use edgemod_core::{Error, Result};
use std::path::Path;
use tracing::{debug, info};

/// Executes package-manager `add` commands
pub trait PackageManagerRunner {
    /// Add `specs` to the project at `project_root`, as dev dependencies when
    /// `dev` is set. Fails when the command exits non-zero.
    fn add(&self, project_root: &Path, specs: &[String], dev: bool) -> Result<()>;
}

/// Runs the real package manager executable with inherited stdio
#[derive(Debug, Clone)]
pub struct DuctRunner {
    package_manager: String,
}

impl DuctRunner {
    pub fn new(package_manager: impl Into<String>) -> Self {
        Self {
            package_manager: package_manager.into(),
        }
    }

    fn args(specs: &[String], dev: bool) -> Vec<String> {
        let mut args = vec!["add".to_string()];
        if dev {
            args.push("-D".to_string());
        }
        args.extend(specs.iter().cloned());
        args
    }
}

impl PackageManagerRunner for DuctRunner {
    fn add(&self, project_root: &Path, specs: &[String], dev: bool) -> Result<()> {
        let args = Self::args(specs, dev);
        let command = format!("{} {}", self.package_manager, args.join(" "));
        debug!("Running {} in {}", command, project_root.display());

        let output = duct::cmd(&self.package_manager, &args)
            .dir(project_root)
            .unchecked()
            .run()
            .map_err(|e| {
                debug!("Failed to spawn {}: {}", self.package_manager, e);
                Error::DependencyInstallFailed {
                    command: command.clone(),
                }
            })?;

        if !output.status.success() {
            return Err(Error::DependencyInstallFailed { command });
        }
        Ok(())
    }
}

fn spec(name: &str, version: Option<&str>) -> String {
    match version.filter(|v| !v.is_empty()) {
        Some(version) => format!("{name}@{version}"),
        None => name.to_string(),
    }
}

/// Flatten a dependency declaration into runtime and dev specifier lists
pub fn normalize_dependencies(declared: Option<&ManifestDependencies>) -> DependencyActions {
    let mut actions = DependencyActions::default();
    let Some(declared) = declared else {
        return actions;
    };

    match declared {
        ManifestDependencies::List(entries) => {
            for entry in entries {
                match entry {
                    DependencyEntry::Name(name) if !name.is_empty() => {
                        actions.dependencies.push(name.clone());
                    }
                    DependencyEntry::Name(_) => {}
                    DependencyEntry::Spec(s) if !s.name.is_empty() => {
                        let value = spec(&s.name, s.version.as_deref());
                        if s.dev {
                            actions.dev_dependencies.push(value);
                        } else {
                            actions.dependencies.push(value);
                        }
                    }
                    DependencyEntry::Spec(_) => {}
                }
            }
        }
        ManifestDependencies::Map(map) => {
            actions.dependencies = map
                .dependencies
                .iter()
                .map(|(name, version)| spec(name, Some(version)))
                .collect();
            actions.dev_dependencies = map
                .dev_dependencies
                .iter()
                .map(|(name, version)| spec(name, Some(version)))
                .collect();
        }
    }

    actions
}

/// Request every declared dependency. In dry-run mode the runner is never
/// invoked; the returned actions still list what would be requested.
pub fn install_dependencies(
    runner: &dyn PackageManagerRunner,
    project_root: &Path,
    declared: Option<&ManifestDependencies>,
    dry_run: bool,
) -> Result<DependencyActions> {
    let actions = normalize_dependencies(declared);
    if actions.is_empty() || dry_run {
        return Ok(actions);
    }

    if !actions.dependencies.is_empty() {
        runner.add(project_root, &actions.dependencies, false)?;
    }
    if !actions.dev_dependencies.is_empty() {
        runner.add(project_root, &actions.dev_dependencies, true)?;
    }

    info!(
        "Added {} dependenc(ies), {} dev dependenc(ies)",
        actions.dependencies.len(),
        actions.dev_dependencies.len()
    );
    Ok(actions)
}
