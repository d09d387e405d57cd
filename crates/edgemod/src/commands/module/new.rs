//! Module new command

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use edgemod_core::config::SettingsOverrides;
use edgemod_modules::{create_module_package, CreateModuleOptions};

use crate::cli::ModuleNewArgs;
use crate::output;
use crate::utils::{resolve_settings, workspace_root};

/// Scaffold a new module package from the starter template
pub(super) fn run(args: ModuleNewArgs, overrides: SettingsOverrides) -> Result<()> {
    let settings = resolve_settings(overrides)?;
    let workspace = workspace_root(&settings)?;

    let created = create_module_package(CreateModuleOptions {
        module_id: args.id.clone(),
        workspace_root: workspace,
        output_dir: args.output_dir.map(Utf8PathBuf::into_std_path_buf),
        label: args.label,
        description: args.description,
        version: args.version,
        package_name: args.package_name,
        route: args.route,
    })
    .with_context(|| format!("Failed to create module '{}'", args.id))?;

    output::success(&format!("Created module {}", created.module_id));
    output::kv("Package", &created.package_name);
    output::kv("Path", &created.module_root.display().to_string());

    output::header("Next steps");
    println!("  1. Edit {}", created.module_root.join("edge-module.json").display());
    println!("  2. edgemod module add {}", created.module_id);

    Ok(())
}
