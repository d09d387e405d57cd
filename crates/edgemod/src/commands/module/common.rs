//! Shared helpers for module subcommands

use anyhow::{Context, Result};
use edgemod_modules::{load_receipts, InstallOutcome};
use owo_colors::OwoColorize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::output;

/// Installed version by module id, read from the project's receipts
pub(super) fn installed_versions(project_root: &Path) -> Result<BTreeMap<String, String>> {
    let receipts = load_receipts(project_root).context("Failed to read install receipts")?;
    Ok(receipts
        .iter()
        .filter_map(|r| Some((r.module_id()?.to_string(), r.version()?.to_string())))
        .collect())
}

/// Path relative to the project root when it lies inside it
pub(super) fn display_path(project_root: &Path, path: &Path) -> String {
    path.strip_prefix(project_root)
        .unwrap_or(path)
        .display()
        .to_string()
}

/// Print what each install step did
pub(super) fn print_install_outcome(project_root: &Path, outcome: &InstallOutcome) {
    let actions = outcome.actions();

    output::header("Dependencies");
    if actions.dependencies.is_empty() {
        println!("  {}", "none".dimmed());
    }
    for spec in &actions.dependencies.dependencies {
        println!("  {} {}", "+".green(), spec);
    }
    for spec in &actions.dependencies.dev_dependencies {
        println!("  {} {} {}", "+".green(), spec, "(dev)".dimmed());
    }

    if !actions.templates.is_empty() {
        output::header("Templates");
        for template in &actions.templates {
            println!("  {} {}", format!("{:<12}", template.status.to_string()).cyan(), template.to);
        }
    }

    if !actions.patches.is_empty() {
        output::header("Patches");
        for patch in &actions.patches {
            println!(
                "  {} {} {}",
                format!("{:<12}", patch.status.to_string()).cyan(),
                patch.target,
                format!("({})", patch.kind).dimmed()
            );
        }
    }

    output::header("Registries");
    let registry = outcome.registry();
    println!(
        "  {} {}",
        changed_label(registry.changed),
        display_path(project_root, &registry.path)
    );
    if let Some(runtime) = &actions.runtime_registry {
        println!(
            "  {} {} {}",
            changed_label(runtime.changed),
            display_path(project_root, &runtime.path),
            format!("({})", runtime.entry.identifier).dimmed()
        );
    }
    println!();
}

/// Status column, padded before colouring
fn changed_label(changed: bool) -> String {
    if changed {
        format!("{:<12}", "updated").cyan().to_string()
    } else {
        format!("{:<12}", "unchanged").dimmed().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_changed_label_is_padded() {
        assert!(changed_label(true).contains("updated     \x1b["));
        assert!(changed_label(false).contains("unchanged   \x1b["));
    }

    #[test]
    fn test_display_path() {
        let root = Path::new("/srv/site");
        assert_eq!(
            display_path(root, Path::new("/srv/site/.edge/modules/forms.json")),
            ".edge/modules/forms.json"
        );
        assert_eq!(display_path(root, Path::new("/tmp/x.json")), "/tmp/x.json");
    }
}
