//! Mock implementations for testing
//!
//! Provides a package-manager runner that records invocations instead of
//! spawning processes.

#![allow(dead_code)]

use edgemod_core::{Error, Result};
use edgemod_modules::PackageManagerRunner;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Record of one `add` invocation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunnerCall {
    pub project_root: PathBuf,
    pub specs: Vec<String>,
    pub dev: bool,
}

/// Records every call; clones share the same log
#[derive(Clone, Debug, Default)]
pub struct RecordingRunner {
    calls: Arc<Mutex<Vec<RunnerCall>>>,
    fail: bool,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// A runner whose every invocation exits non-zero
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<RunnerCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl PackageManagerRunner for RecordingRunner {
    fn add(&self, project_root: &Path, specs: &[String], dev: bool) -> Result<()> {
        self.calls.lock().unwrap().push(RunnerCall {
            project_root: project_root.to_path_buf(),
            specs: specs.to_vec(),
            dev,
        });
        if self.fail {
            let flag = if dev { " -D" } else { "" };
            return Err(Error::DependencyInstallFailed {
                command: format!("pnpm add{} {}", flag, specs.join(" ")),
            });
        }
        Ok(())
    }
}
