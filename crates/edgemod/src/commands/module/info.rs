//! Module info command

use anyhow::{anyhow, Context, Result};
use edgemod_core::config::SettingsOverrides;
use edgemod_modules::receipt::find_receipt;
use edgemod_modules::resolve_module_by_id;
use owo_colors::OwoColorize;

use crate::cli::ModuleInfoArgs;
use crate::output;
use crate::utils::{resolve_settings, workspace_root};

/// Show a module's manifest summary and its install state in the project
pub(super) fn run(args: ModuleInfoArgs, overrides: SettingsOverrides) -> Result<()> {
    let settings = resolve_settings(overrides)?;
    let workspace = workspace_root(&settings)?;

    let module = resolve_module_by_id(&workspace, &args.id)
        .context("Failed to discover modules")?
        .ok_or_else(|| anyhow!("Module '{}' not found in {}", args.id, workspace.display()))?;
    let receipt = find_receipt(&settings.project_root, &args.id)?;

    if args.json {
        let value = serde_json::json!({
            "manifest": module.manifest,
            "manifestPath": module.manifest_path,
            "installedVersion": receipt.as_ref().and_then(|r| r.version()),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let manifest = &module.manifest;
    output::header(&format!("Module: {}", manifest.id));
    output::kv("Version", &manifest.version);
    if let Some(label) = &manifest.label {
        output::kv("Label", label);
    }
    if let Some(description) = &manifest.description {
        output::kv("Description", description);
    }
    if let Some(route) = &manifest.route {
        output::kv("Route", route);
    }
    output::kv("Manifest", &module.manifest_path.display().to_string());
    if let Some(platform) = manifest
        .compatibility
        .as_ref()
        .and_then(|c| c.platform.as_deref())
    {
        output::kv("Platform", platform);
    }

    output::header("Contents");
    if let Some(deps) = &manifest.dependencies {
        let (runtime, dev) = deps.counts();
        output::kv("Dependencies", &format!("{runtime} runtime, {dev} dev"));
    }
    output::kv("Templates", &manifest.template_count().to_string());
    output::kv("Patches", &manifest.patches.len().to_string());
    if let Some(runtime) = &manifest.runtime {
        output::kv(
            "Runtime",
            &format!("{} -> {} ({})", runtime.entry, runtime.target, runtime.export_name()),
        );
    }

    if !manifest.breaking_changes.is_empty() {
        output::header("Breaking Changes");
        for change in &manifest.breaking_changes {
            println!("  {} {}", change.version.yellow(), change.description);
        }
    }

    output::header("Status");
    match receipt.as_ref().and_then(|r| r.version()) {
        Some(v) if v == manifest.version => {
            println!("  {} installed {}", "✓".green(), v)
        }
        Some(v) => println!(
            "  {} installed {}, run edgemod module upgrade {} for {}",
            "⚠".yellow(),
            v,
            manifest.id,
            manifest.version
        ),
        None => println!("  {}", "not installed".dimmed()),
    }

    Ok(())
}
