//! Module doctor command

use anyhow::Result;
use edgemod_core::config::SettingsOverrides;
use edgemod_doctor::{doctor_project, DiagnosticReporter};

use crate::cli::ModuleDoctorArgs;
use crate::utils::resolve_settings;

/// Diagnose module drift in the project
pub(super) fn run(args: ModuleDoctorArgs, overrides: SettingsOverrides) -> Result<()> {
    let settings = resolve_settings(overrides)?;
    let report = doctor_project(&settings.project_root);

    let reporter = DiagnosticReporter::new("Edge Module Doctor");
    println!("{}", reporter.format(&report, args.format));

    if !report.ok {
        std::process::exit(report.exit_code());
    }
    Ok(())
}
