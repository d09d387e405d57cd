//! Utility functions shared across CLI commands

use anyhow::{Context, Result};
use edgemod_core::config::{InstallerSettings, SettingsOverrides};
use edgemod_modules::get_workspace_root;
use std::path::PathBuf;
use tracing::debug;

/// Resolve installer settings from flags, environment and sentinel file
pub fn resolve_settings(overrides: SettingsOverrides) -> Result<InstallerSettings> {
    InstallerSettings::resolve(overrides).context("Failed to resolve installer settings")
}

/// Workspace root for the resolved settings
pub fn workspace_root(settings: &InstallerSettings) -> Result<PathBuf> {
    let root = get_workspace_root(&settings.project_root, settings.workspace_root.as_deref())
        .context("Failed to locate the module workspace")?;
    debug!("Using workspace root {}", root.display());
    Ok(root)
}
