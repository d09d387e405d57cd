//! Workspace and project fixtures
//!
//! A fixture is a temporary pnpm workspace with module packages under
//! `modules/` and a sentinel-marked target project under `apps/site`.

#![allow(dead_code)]

use edgemod_core::config::PROJECT_SENTINEL;
use edgemod_modules::ModuleInstaller;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use super::constants::PROJECT_DIR;
use super::mocks::RecordingRunner;

pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Workspace with a pnpm marker and an empty sentinel-marked project
    pub fn new() -> Self {
        Self::with_sentinel("{\"project\": \"site\"}\n")
    }

    pub fn with_sentinel(sentinel: &str) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        fs::write(
            temp_dir.path().join("pnpm-workspace.yaml"),
            "packages:\n  - 'modules/*'\n  - 'apps/*'\n",
        )
        .unwrap();
        let project = temp_dir.path().join(PROJECT_DIR);
        fs::create_dir_all(&project).unwrap();
        fs::write(project.join(PROJECT_SENTINEL), sentinel).unwrap();
        Self { temp_dir }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn project_root(&self) -> PathBuf {
        self.root().join(PROJECT_DIR)
    }

    pub fn module_root(&self, id: &str) -> PathBuf {
        self.root().join("modules").join(id)
    }

    /// Write (or rewrite) a module package
    pub fn add_module(&self, manifest: &Value, files: &[(&str, &str)]) -> PathBuf {
        let id = manifest["id"].as_str().expect("manifest id");
        let dir = self.module_root(id);
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("edge-module.json"),
            serde_json::to_string_pretty(manifest).unwrap(),
        )
        .unwrap();
        for (rel, content) in files {
            write_file(&dir.join(rel), content);
        }
        dir
    }

    /// Write a file inside the project
    pub fn write_project_file(&self, rel: &str, content: &str) {
        write_file(&self.project_root().join(rel), content);
    }

    pub fn project_path(&self, rel: &str) -> PathBuf {
        self.project_root().join(rel)
    }

    pub fn read_project_file(&self, rel: &str) -> String {
        fs::read_to_string(self.project_path(rel))
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", rel, e))
    }

    /// Installer for the project with a recording runner
    pub fn installer(&self, runner: &RecordingRunner) -> ModuleInstaller {
        ModuleInstaller::new(self.project_root(), self.root()).with_runner(runner.clone())
    }
}

pub fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}
