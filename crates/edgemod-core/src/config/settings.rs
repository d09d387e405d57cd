//! Layered installer settings
//!
//! Resolution order (low to high):
//! 1. Built-in defaults
//! 2. Project sentinel file (edgeapp.project.json)
//! 3. Environment variables (EDGE_* prefix)
//! 4. CLI flags (passed in as [`SettingsOverrides`])

use std::env;
use std::path::PathBuf;
use tracing::debug;

use super::layout::{
    ProjectLayout, DEFAULT_PACKAGE_MANAGER, PACKAGE_MANAGER_ENV, PROJECT_ROOT_ENV,
    WORKSPACE_ROOT_ENV,
};
use super::project::ProjectConfig;
use crate::error::{Error, Result};
use crate::utils::resolve_absolute_path;

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub project_root: Option<PathBuf>,
    pub workspace_root: Option<PathBuf>,
    pub package_manager: Option<String>,
}

/// Effective settings for one installer invocation
#[derive(Debug, Clone)]
pub struct InstallerSettings {
    /// Absolute target project root
    pub project_root: PathBuf,

    /// Explicit workspace root, when one was configured
    pub workspace_root: Option<PathBuf>,

    /// Package manager executable used for dependency installs
    pub package_manager: String,

    /// Sentinel contents, when the project has one
    pub project: Option<ProjectConfig>,
}

impl InstallerSettings {
    /// Resolve settings for the current process
    pub fn resolve(overrides: SettingsOverrides) -> Result<Self> {
        let project_root = match overrides.project_root.or_else(|| env_path(PROJECT_ROOT_ENV)) {
            Some(path) => resolve_absolute_path(&path)?,
            None => env::current_dir()?,
        };

        let layout = ProjectLayout::new(&project_root);
        let project = if layout.is_edge_project() {
            Some(ProjectConfig::load(&project_root)?)
        } else {
            None
        };

        let mut package_manager = DEFAULT_PACKAGE_MANAGER.to_string();
        if let Some(pm) = project.as_ref().and_then(|p| p.package_manager.clone()) {
            package_manager = pm;
        }
        if let Some(pm) = env_value(PACKAGE_MANAGER_ENV) {
            package_manager = pm;
        }
        if let Some(pm) = overrides.package_manager {
            package_manager = pm;
        }
        if package_manager.trim().is_empty() {
            return Err(Error::invalid_config("package manager must not be empty"));
        }

        let workspace_root = match overrides
            .workspace_root
            .or_else(|| env_path(WORKSPACE_ROOT_ENV))
        {
            Some(path) => Some(resolve_absolute_path(&path)?),
            None => None,
        };

        debug!(
            "Resolved settings: project_root={}, package_manager={}",
            project_root.display(),
            package_manager
        );

        Ok(Self {
            project_root,
            workspace_root,
            package_manager,
            project,
        })
    }

    /// Settings for a given project root with everything else from the environment
    pub fn for_project(project_root: impl Into<PathBuf>) -> Result<Self> {
        Self::resolve(SettingsOverrides {
            project_root: Some(project_root.into()),
            ..Default::default()
        })
    }

    pub fn layout(&self) -> ProjectLayout {
        ProjectLayout::new(&self.project_root)
    }

    /// Platform version declared by the project sentinel
    pub fn platform_version(&self) -> Option<&str> {
        self.project
            .as_ref()
            .and_then(|p| p.platform_version.as_deref())
    }
}

fn env_value(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_path(key: &str) -> Option<PathBuf> {
    env_value(key).map(PathBuf::from)
}
