//! Workspace discovery
//!
//! Locates the monorepo root that holds module packages and enumerates the
//! packages that carry a module manifest. Discovery is recomputed on every
//! call; nothing is cached.

use edgemod_core::config::{
    DEFAULT_PACKAGE_GLOBS, PACKAGE_JSON_FILE, PNPM_WORKSPACE_FILE, WORKSPACE_ROOT_ENV,
};
use edgemod_core::types::ModuleManifest;
use edgemod_core::utils::resolve_absolute_path;
use edgemod_core::{Error, Result};
use serde::Deserialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::manifest::load_module_manifest;

/// A workspace package that declares a module
#[derive(Debug, Clone)]
pub struct ModulePackageEntry {
    pub manifest: ModuleManifest,
    pub manifest_path: PathBuf,
    pub module_root: PathBuf,
}

#[derive(Debug, Default, Deserialize)]
struct PnpmWorkspace {
    #[serde(default)]
    packages: Vec<String>,
}

fn has_workspace_config(package_json: &Path) -> bool {
    fs::read_to_string(package_json)
        .ok()
        .and_then(|content| serde_json::from_str::<Value>(&content).ok())
        .and_then(|pkg| pkg.get("workspaces").cloned())
        .is_some_and(|ws| !ws.is_null())
}

fn is_workspace_root(dir: &Path) -> bool {
    dir.join(PNPM_WORKSPACE_FILE).is_file() || {
        let package_json = dir.join(PACKAGE_JSON_FILE);
        package_json.is_file() && has_workspace_config(&package_json)
    }
}

/// Nearest directory at or above `start` that holds a workspace marker
pub fn find_workspace_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| is_workspace_root(dir))
        .map(Path::to_path_buf)
}

/// Resolve the workspace root for a project.
///
/// Order: explicit override, `EDGE_MODULE_WORKSPACE_ROOT`, nearest workspace
/// above the project, nearest workspace above the current directory, and
/// finally the project root itself.
pub fn get_workspace_root(project_root: &Path, override_root: Option<&Path>) -> Result<PathBuf> {
    if let Some(root) = override_root {
        return resolve_absolute_path(root);
    }

    if let Some(root) = std::env::var_os(WORKSPACE_ROOT_ENV).filter(|v| !v.is_empty()) {
        return resolve_absolute_path(Path::new(&root));
    }

    let project_root = resolve_absolute_path(project_root)?;
    if let Some(root) = find_workspace_root(&project_root) {
        return Ok(root);
    }

    let cwd = std::env::current_dir()?;
    if let Some(root) = find_workspace_root(&cwd) {
        return Ok(root);
    }

    debug!(
        "No workspace marker found; using project root {}",
        project_root.display()
    );
    Ok(project_root)
}

fn package_json_globs(package_json: &Path) -> Vec<String> {
    let Some(pkg) = fs::read_to_string(package_json)
        .ok()
        .and_then(|content| serde_json::from_str::<Value>(&content).ok())
    else {
        return Vec::new();
    };

    let list = match pkg.get("workspaces") {
        Some(Value::Array(items)) => items.clone(),
        Some(Value::Object(obj)) => obj
            .get("packages")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default(),
        _ => Vec::new(),
    };

    list.iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect()
}

/// Package directory globs declared by the workspace, or the defaults
pub fn read_workspace_globs(workspace_root: &Path) -> Vec<String> {
    let pnpm = workspace_root.join(PNPM_WORKSPACE_FILE);
    let declared = if pnpm.is_file() {
        match fs::read_to_string(&pnpm)
            .map_err(Error::from)
            .and_then(|c| serde_yaml_ng::from_str::<PnpmWorkspace>(&c).map_err(Error::from))
        {
            Ok(ws) => ws.packages,
            Err(e) => {
                warn!("Failed to read {}: {}", pnpm.display(), e);
                Vec::new()
            }
        }
    } else {
        package_json_globs(&workspace_root.join(PACKAGE_JSON_FILE))
    };

    let globs: Vec<String> = declared
        .into_iter()
        .map(|g| g.trim().to_string())
        .filter(|g| !g.is_empty() && !g.starts_with('!'))
        .collect();

    if globs.is_empty() {
        DEFAULT_PACKAGE_GLOBS.iter().map(|g| g.to_string()).collect()
    } else {
        globs
    }
}

/// Expand globs into existing directories, first-seen order, no duplicates
pub fn expand_package_dirs(workspace_root: &Path, globs: &[String]) -> Vec<PathBuf> {
    let root = glob::Pattern::escape(&workspace_root.to_string_lossy());
    let mut seen = HashSet::new();
    let mut dirs = Vec::new();

    for pattern in globs {
        let full = format!("{}/{}", root.trim_end_matches('/'), pattern.trim_start_matches("./"));
        let paths = match glob::glob(&full) {
            Ok(paths) => paths,
            Err(e) => {
                warn!("Ignoring invalid workspace glob '{}': {}", pattern, e);
                continue;
            }
        };
        for path in paths.flatten() {
            if path.is_dir() && seen.insert(path.clone()) {
                dirs.push(path);
            }
        }
    }

    dirs
}

/// Every workspace package that declares a module.
///
/// Packages without a manifest are skipped; an invalid manifest or two
/// packages declaring the same id fail discovery.
pub fn discover_module_packages(workspace_root: &Path) -> Result<Vec<ModulePackageEntry>> {
    let globs = read_workspace_globs(workspace_root);
    let dirs = expand_package_dirs(workspace_root, &globs);
    debug!(
        "Scanning {} package director(ies) under {}",
        dirs.len(),
        workspace_root.display()
    );

    let mut entries: Vec<ModulePackageEntry> = Vec::new();
    let mut by_id: HashMap<String, usize> = HashMap::new();

    for dir in dirs {
        let Some(loaded) = load_module_manifest(&dir)? else {
            continue;
        };

        if let Some(&index) = by_id.get(&loaded.manifest.id) {
            return Err(Error::DuplicateModuleId {
                id: loaded.manifest.id,
                first: entries[index].manifest_path.clone(),
                second: loaded.manifest_path,
            });
        }

        by_id.insert(loaded.manifest.id.clone(), entries.len());
        entries.push(ModulePackageEntry {
            manifest: loaded.manifest,
            manifest_path: loaded.manifest_path,
            module_root: dir,
        });
    }

    Ok(entries)
}

/// The package declaring `module_id`, if any
pub fn resolve_module_by_id(
    workspace_root: &Path,
    module_id: &str,
) -> Result<Option<ModulePackageEntry>> {
    Ok(discover_module_packages(workspace_root)?
        .into_iter()
        .find(|entry| entry.manifest.id == module_id))
}
