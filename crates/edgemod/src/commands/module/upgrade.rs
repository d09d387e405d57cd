//! Module upgrade command

use anyhow::{anyhow, Context, Result};
use edgemod_core::config::SettingsOverrides;
use edgemod_modules::receipt::find_receipt;
use edgemod_modules::{InstallOptions, ModuleInstaller};

use super::common::print_install_outcome;
use crate::cli::ModuleUpgradeArgs;
use crate::output;
use crate::utils::resolve_settings;

/// Re-install an installed module at the version the workspace declares
///
/// Breaking changes between the installed and new version are listed and
/// recorded in the new receipt.
pub(super) fn run(args: ModuleUpgradeArgs, overrides: SettingsOverrides) -> Result<()> {
    let settings = resolve_settings(overrides)?;
    let installer = ModuleInstaller::from_settings(&settings)?;

    let previous = find_receipt(&settings.project_root, &args.id)?
        .and_then(|r| r.version().map(str::to_string))
        .ok_or_else(|| {
            anyhow!(
                "Module '{}' is not installed; run edgemod module add {} first",
                args.id,
                args.id
            )
        })?;

    let outcome = installer
        .install(&args.id, InstallOptions { dry_run: args.dry_run })
        .with_context(|| format!("Failed to upgrade module '{}'", args.id))?;
    let manifest = &outcome.module.manifest;

    if previous == manifest.version {
        output::info(&format!(
            "{} is already at {}; re-applied install steps",
            manifest.id, manifest.version
        ));
    }

    print_install_outcome(&settings.project_root, &outcome);

    if let Some(upgrade) = outcome.upgrade() {
        for change in &upgrade.breaking_changes {
            output::warning(&format!(
                "Breaking change in {}: {}",
                change.version, change.description
            ));
        }
        let verb = if outcome.dry_run { "Would upgrade" } else { "Upgraded" };
        output::success(&format!(
            "{} {} {} -> {}",
            verb, manifest.id, upgrade.from_version, upgrade.to_version
        ));
    }

    Ok(())
}
