//! Module validate command

use anyhow::Result;
use edgemod_core::config::SettingsOverrides;
use edgemod_doctor::validate_project;

use crate::cli::ModuleValidateArgs;
use crate::utils::resolve_settings;

/// Check the project registries against install receipts; exits 1 on any issue
pub(super) fn run(args: ModuleValidateArgs, overrides: SettingsOverrides) -> Result<()> {
    let settings = resolve_settings(overrides)?;
    let report = validate_project(&settings.project_root);

    println!("{}", report.format(args.format));

    if !report.ok {
        std::process::exit(report.exit_code());
    }
    Ok(())
}
