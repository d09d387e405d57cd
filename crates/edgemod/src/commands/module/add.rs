//! Module add command

use anyhow::{Context, Result};
use edgemod_core::config::SettingsOverrides;
use edgemod_modules::{InstallOptions, ModuleInstaller};

use super::common::{display_path, print_install_outcome};
use crate::cli::ModuleAddArgs;
use crate::output;
use crate::utils::resolve_settings;

/// Install a module into the project
///
/// Supports:
/// - Install: `edgemod module add forms`
/// - Preview: `edgemod module add forms --dry-run`
/// - Receipt as JSON: `edgemod module add forms --json`
pub(super) fn run(args: ModuleAddArgs, overrides: SettingsOverrides) -> Result<()> {
    let settings = resolve_settings(overrides)?;
    let installer = ModuleInstaller::from_settings(&settings)?;

    let outcome = installer
        .install(&args.id, InstallOptions { dry_run: args.dry_run })
        .with_context(|| format!("Failed to install module '{}'", args.id))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome.receipt)?);
        return Ok(());
    }

    print_install_outcome(&settings.project_root, &outcome);

    let manifest = &outcome.module.manifest;
    let receipt = display_path(&settings.project_root, &outcome.receipt_path);
    if outcome.dry_run {
        output::info(&format!(
            "Dry run: {} {} not installed, receipt would be written to {}",
            manifest.id, manifest.version, receipt
        ));
    } else {
        output::success(&format!("Installed {} {}", manifest.id, manifest.version));
        output::kv("Receipt", &receipt);
    }

    Ok(())
}
