//! Module remove command

use anyhow::{Context, Result};
use edgemod_core::config::SettingsOverrides;
use edgemod_modules::{InstallOptions, ModuleInstaller};

use super::common::display_path;
use crate::cli::ModuleRemoveArgs;
use crate::output;
use crate::utils::resolve_settings;

/// Remove a module's registry entries and mark it disabled
///
/// Files created by templates and patches stay in place; the receipt is kept
/// so a later `edgemod module add` re-enables the module.
pub(super) fn run(args: ModuleRemoveArgs, overrides: SettingsOverrides) -> Result<()> {
    let settings = resolve_settings(overrides)?;
    let installer = ModuleInstaller::from_settings(&settings)?;

    let outcome = installer
        .uninstall(&args.id, InstallOptions { dry_run: args.dry_run })
        .with_context(|| format!("Failed to remove module '{}'", args.id))?;

    if !outcome.registry_changed && !outcome.runtime_registry_changed {
        output::info(&format!("{} had no registry entries", outcome.module_id));
    }

    let verb = if outcome.dry_run { "Would remove" } else { "Removed" };
    output::success(&format!("{} {} {}", verb, outcome.module_id, outcome.version));
    output::kv(
        "Receipt kept",
        &display_path(&settings.project_root, &outcome.receipt_path),
    );
    output::warning("Template files and patches are not reverted");

    Ok(())
}
