//! Project sentinel file (edgeapp.project.json)

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use tracing::debug;

use super::layout::PROJECT_SENTINEL;
use crate::error::{Error, Result};

/// Parsed sentinel file of a target project
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    /// Project name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,

    /// Platform version checked against module compatibility ranges
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_system_version: Option<String>,

    /// Package manager used for dependency installs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_manager: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProjectConfig {
    /// Load the sentinel file from a project root.
    ///
    /// A missing sentinel is `NotAnEdgeProject`. An empty file is accepted as
    /// a bare marker with no settings.
    pub fn load(project_root: &Path) -> Result<Self> {
        let path = project_root.join(PROJECT_SENTINEL);
        if !path.is_file() {
            return Err(Error::not_an_edge_project(project_root, PROJECT_SENTINEL));
        }

        let content = fs::read_to_string(&path)?;
        if content.trim().is_empty() {
            debug!("Sentinel {} is empty", path.display());
            return Ok(Self::default());
        }

        serde_json::from_str(&content).map_err(|e| {
            Error::invalid_config(format!("Failed to parse {}: {}", path.display(), e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_sentinel() {
        let temp = TempDir::new().unwrap();
        let err = ProjectConfig::load(temp.path()).unwrap_err();
        assert!(matches!(err, Error::NotAnEdgeProject { .. }));
        assert!(err.to_string().contains(PROJECT_SENTINEL));
    }

    #[test]
    fn test_load_sentinel_fields() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(PROJECT_SENTINEL),
            r#"{"project": "demo", "platformVersion": "2.3.0", "packageManager": "npm", "owner": "web"}"#,
        )
        .unwrap();

        let config = ProjectConfig::load(temp.path()).unwrap();
        assert_eq!(config.project.as_deref(), Some("demo"));
        assert_eq!(config.platform_version.as_deref(), Some("2.3.0"));
        assert_eq!(config.package_manager.as_deref(), Some("npm"));
        assert_eq!(config.extra["owner"], "web");
    }

    #[test]
    fn test_empty_sentinel_is_a_bare_marker() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(PROJECT_SENTINEL), "").unwrap();
        assert_eq!(ProjectConfig::load(temp.path()).unwrap(), ProjectConfig::default());
    }
}
