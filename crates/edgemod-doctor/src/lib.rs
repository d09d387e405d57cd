//! edgemod Doctor - Project Consistency Checking
//!
//! This crate cross-checks the three sources of truth a module-capable
//! project carries: the version ledger, the runtime registry and the
//! per-module install receipts.
//!
//! # Features
//!
//! - **Drift Detection**: ledger entries without receipts, receipts without
//!   ledger entries, and version mismatches between the two
//! - **Leveled Findings**: every issue is a `warn` or an `error` with a
//!   suggested remedy
//! - **Multi-Format Output**: Human-readable, JSON, and YAML output formats
//!
//! # Example
//!
//! ```rust,no_run
//! use edgemod_doctor::{validate_project, OutputFormat};
//! use std::path::Path;
//!
//! let report = validate_project(Path::new("."));
//! println!("{}", report.format(OutputFormat::Human));
//! std::process::exit(report.exit_code());
//! ```

mod checker;
mod reporter;

pub use checker::{Issue, IssueLevel, ProjectChecker};
pub use reporter::{DiagnosticReporter, OutputFormat};

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Outcome of a consistency check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// True only when there are no issues at all, warnings included
    pub ok: bool,
    pub issues: Vec<Issue>,
}

impl ValidationReport {
    pub fn from_issues(issues: Vec<Issue>) -> Self {
        Self {
            ok: issues.is_empty(),
            issues,
        }
    }

    /// A clean report
    pub fn clean() -> Self {
        Self::from_issues(Vec::new())
    }

    pub fn error_count(&self) -> usize {
        self.count(IssueLevel::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(IssueLevel::Warn)
    }

    fn count(&self, level: IssueLevel) -> usize {
        self.issues.iter().filter(|i| i.level == level).count()
    }

    /// Format the report for display
    pub fn format(&self, format: OutputFormat) -> String {
        DiagnosticReporter::default().format(self, format)
    }

    /// Process exit code: 1 when the report is not ok
    pub fn exit_code(&self) -> i32 {
        if self.ok {
            0
        } else {
            1
        }
    }
}

/// Check a project for drift between its ledgers and receipts
pub fn validate_project(project_root: &Path) -> ValidationReport {
    ValidationReport::from_issues(ProjectChecker::new(project_root).check())
}

/// Diagnose a project. Currently reports exactly what validation finds; a
/// clean project yields an empty issue list.
pub fn doctor_project(project_root: &Path) -> ValidationReport {
    let validation = validate_project(project_root);
    if validation.ok {
        return ValidationReport::clean();
    }
    validation
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_requires_no_warnings() {
        let report = ValidationReport::from_issues(vec![Issue::warn("w", "s")]);
        assert!(!report.ok);
        assert_eq!(report.exit_code(), 1);
        assert_eq!(report.warning_count(), 1);
        assert_eq!(report.error_count(), 0);
        assert!(ValidationReport::clean().ok);
    }
}
