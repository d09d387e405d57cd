//! Install receipts and the disabled-module list

use chrono::Utc;
use edgemod_core::config::ProjectLayout;
use edgemod_core::types::{DisabledModule, DisabledModules, InstallReceipt, LoadedReceipt};
use edgemod_core::utils::to_sorted_json;
use edgemod_core::Result;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::ledger::write_if_changed;

/// Every `*.json` file directly inside the receipts directory, sorted by
/// path. Files that fail to parse are returned as `Unreadable`.
pub fn load_receipts(project_root: &Path) -> Result<Vec<LoadedReceipt>> {
    let dir = ProjectLayout::new(project_root).receipts_dir();
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut paths: Vec<PathBuf> = fs::read_dir(&dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    Ok(paths.into_iter().map(load_receipt_file).collect())
}

fn load_receipt_file(path: PathBuf) -> LoadedReceipt {
    let parsed = fs::read_to_string(&path)
        .map_err(|e| e.to_string())
        .and_then(|content| serde_json::from_str::<Value>(&content).map_err(|e| e.to_string()));
    match parsed {
        Ok(data) => LoadedReceipt::Parsed { path, data },
        Err(error) => {
            debug!("Unreadable receipt {}: {}", path.display(), error);
            LoadedReceipt::Unreadable { path, error }
        }
    }
}

/// Typed receipt at `path`, or `None` when absent or not a valid receipt
pub fn read_receipt(path: &Path) -> Option<InstallReceipt> {
    let content = fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
}

/// Find the receipt recording `module_id`: the default location first, then
/// any receipt in the receipts directory whose `moduleId` matches.
pub fn find_receipt(project_root: &Path, module_id: &str) -> Result<Option<LoadedReceipt>> {
    let default_path = ProjectLayout::new(project_root).receipt_path(module_id, None);
    if default_path.is_file() {
        let receipt = load_receipt_file(default_path);
        if receipt.module_id() == Some(module_id) {
            return Ok(Some(receipt));
        }
    }

    Ok(load_receipts(project_root)?
        .into_iter()
        .find(|r| r.module_id() == Some(module_id)))
}

/// Write a receipt as key-sorted JSON
pub fn write_receipt(path: &Path, receipt: &InstallReceipt, dry_run: bool) -> Result<()> {
    if dry_run {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, to_sorted_json(receipt)?)?;
    debug!("Wrote receipt {}", path.display());
    Ok(())
}

/// The disabled-module list; a missing file reads as empty
pub fn read_disabled(layout: &ProjectLayout) -> Result<DisabledModules> {
    let path = layout.disabled_modules();
    if !path.is_file() {
        return Ok(DisabledModules::default());
    }
    let content = fs::read_to_string(&path)?;
    if content.trim().is_empty() {
        return Ok(DisabledModules::default());
    }
    Ok(serde_json::from_str(&content)?)
}

fn write_disabled(layout: &ProjectLayout, disabled: &DisabledModules, dry_run: bool) -> Result<bool> {
    let path = layout.disabled_modules();
    let original = fs::read_to_string(&path).ok();
    write_if_changed(&path, original.as_deref(), &to_sorted_json(disabled)?, dry_run)
}

/// Record a module as disabled at `version`
pub fn mark_disabled(
    layout: &ProjectLayout,
    module_id: &str,
    version: &str,
    dry_run: bool,
) -> Result<()> {
    let mut disabled = read_disabled(layout)?;
    disabled.modules.insert(
        module_id.to_string(),
        DisabledModule {
            version: version.to_string(),
            disabled_at: Utc::now(),
        },
    );
    write_disabled(layout, &disabled, dry_run)?;
    Ok(())
}

/// Drop a module's disabled mark. Returns whether one was present.
pub fn clear_disabled(layout: &ProjectLayout, module_id: &str, dry_run: bool) -> Result<bool> {
    let mut disabled = read_disabled(layout)?;
    if disabled.modules.remove(module_id).is_none() {
        return Ok(false);
    }
    write_disabled(layout, &disabled, dry_run)?;
    Ok(true)
}
