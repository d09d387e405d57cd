//! Module list command

use anyhow::{Context, Result};
use edgemod_core::config::SettingsOverrides;
use edgemod_modules::discover_module_packages;
use owo_colors::OwoColorize;
use serde::Serialize;

use super::common::installed_versions;
use crate::cli::ModuleListArgs;
use crate::output;
use crate::utils::{resolve_settings, workspace_root};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ModuleRow {
    id: String,
    version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    installed_version: Option<String>,
    path: String,
}

/// List workspace modules with their install state in the project
///
/// Supports:
/// - All workspace modules: `edgemod module list`
/// - Installed only: `edgemod module list --installed`
/// - JSON output: `edgemod module list --json`
pub(super) fn run(args: ModuleListArgs, overrides: SettingsOverrides) -> Result<()> {
    let settings = resolve_settings(overrides)?;
    let workspace = workspace_root(&settings)?;

    let modules = discover_module_packages(&workspace).context("Failed to discover modules")?;
    let installed = installed_versions(&settings.project_root)?;

    let rows: Vec<ModuleRow> = modules
        .into_iter()
        .map(|entry| ModuleRow {
            installed_version: installed.get(&entry.manifest.id).cloned(),
            path: entry
                .module_root
                .strip_prefix(&workspace)
                .unwrap_or(&entry.module_root)
                .display()
                .to_string(),
            id: entry.manifest.id,
            version: entry.manifest.version,
            label: entry.manifest.label,
        })
        .filter(|row| !args.installed || row.installed_version.is_some())
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        output::info(&format!("No modules found in {}", workspace.display()));
        return Ok(());
    }

    output::header(&format!("Modules in {}", workspace.display()));
    for row in &rows {
        let state = match &row.installed_version {
            Some(v) if *v == row.version => format!("installed {v}").green().to_string(),
            Some(v) => format!("installed {v}, {} available", row.version)
                .yellow()
                .to_string(),
            None => "not installed".dimmed().to_string(),
        };
        println!(
            "  {:<24} {:<10} {}  {}",
            row.id.bold(),
            row.version,
            state,
            row.label.as_deref().unwrap_or_default().dimmed()
        );
    }
    println!();
    output::kv("Total", &rows.len().to_string());

    Ok(())
}
