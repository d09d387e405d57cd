//! Validation report formatting
//!
//! Provides formatting for validation reports in multiple output formats:
//! human-readable, JSON, and YAML.

use owo_colors::OwoColorize;
use std::str::FromStr;

use crate::checker::{Issue, IssueLevel};
use crate::ValidationReport;

/// Output format for validation reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable colored output
    #[default]
    Human,
    /// JSON format for machine consumption
    Json,
    /// YAML format for machine consumption
    Yaml,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" | "text" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            other => Err(format!("Unknown output format: {other}")),
        }
    }
}

/// Validation report reporter
pub struct DiagnosticReporter {
    title: &'static str,
}

impl DiagnosticReporter {
    pub fn new(title: &'static str) -> Self {
        Self { title }
    }

    /// Format the report
    pub fn format(&self, report: &ValidationReport, format: OutputFormat) -> String {
        match format {
            OutputFormat::Human => self.format_human(report),
            OutputFormat::Json => self.format_json(report),
            OutputFormat::Yaml => self.format_yaml(report),
        }
    }

    fn format_human(&self, report: &ValidationReport) -> String {
        let mut output = String::new();
        output.push_str(&format!("{}\n", self.title.bold()));

        for issue in &report.issues {
            output.push_str(&self.format_issue(issue));
        }
        if !report.issues.is_empty() {
            output.push('\n');
        }

        output.push_str(&self.format_summary(report));
        output
    }

    fn format_issue(&self, issue: &Issue) -> String {
        let mut output = String::new();
        let (icon, message) = match issue.level {
            IssueLevel::Error => ("✗".red().to_string(), issue.message.red().to_string()),
            IssueLevel::Warn => ("⚠".yellow().to_string(), issue.message.yellow().to_string()),
        };
        output.push_str(&format!("  {} {}\n", icon, message));
        if let Some(suggestion) = &issue.suggestion {
            output.push_str(&format!("      {} {}\n", "→".dimmed(), suggestion.dimmed()));
        }
        output
    }

    fn format_summary(&self, report: &ValidationReport) -> String {
        let mut output = String::new();
        output.push_str(&format!("{}\n", "Summary".bold().underline()));

        if report.ok {
            output.push_str(&format!("  {} Project is consistent.\n", "✓".green()));
        } else {
            output.push_str(&format!(
                "  {} {} error(s), {} warning(s)\n",
                if report.error_count() > 0 {
                    "✗".red().to_string()
                } else {
                    "⚠".yellow().to_string()
                },
                report.error_count(),
                report.warning_count()
            ));
        }
        output
    }

    fn format_json(&self, report: &ValidationReport) -> String {
        serde_json::to_string_pretty(report)
            .unwrap_or_else(|e| format!("{{\"error\": \"Failed to serialize: {}\"}}", e))
    }

    fn format_yaml(&self, report: &ValidationReport) -> String {
        serde_yaml_ng::to_string(report)
            .unwrap_or_else(|e| format!("error: \"Failed to serialize: {}\"", e))
    }
}

impl Default for DiagnosticReporter {
    fn default() -> Self {
        Self::new("Edge Module Validation")
    }
}
