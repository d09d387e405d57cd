//! Template materialization
//!
//! Copies module-owned files and directories into a project. Text files have
//! the module's tokens substituted on the way; binary files are copied as-is.
//! Existing destinations are only replaced when the template asks for it.

use edgemod_core::types::{ModuleManifest, TemplateAction, TemplateSpec, TemplateStatus};
use edgemod_core::utils::{to_camel_case, to_module_label, to_pascal_case};
use edgemod_core::{Error, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Literal tokens replaced in text templates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenSet {
    tokens: Vec<(String, String)>,
}

impl TokenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a token
    pub fn with(mut self, token: impl Into<String>, value: impl Into<String>) -> Self {
        let token = token.into();
        let value = value.into();
        match self.tokens.iter_mut().find(|(t, _)| *t == token) {
            Some(existing) => existing.1 = value,
            None => self.tokens.push((token, value)),
        }
        self
    }

    /// Tokens derived from a manifest
    pub fn for_manifest(manifest: &ModuleManifest) -> Self {
        let label = manifest
            .label
            .clone()
            .unwrap_or_else(|| to_module_label(&manifest.id));
        let description = manifest
            .description
            .clone()
            .unwrap_or_else(|| format!("{label} module."));
        let route = manifest
            .route
            .clone()
            .unwrap_or_else(|| default_route(&manifest.id));

        Self::new()
            .with("__MODULE_ID__", manifest.id.as_str())
            .with("__MODULE_VERSION__", manifest.version.as_str())
            .with("__MODULE_LABEL__", label)
            .with("__MODULE_DESCRIPTION__", description)
            .with("__MODULE_ROUTE__", route)
            .with("__MODULE_CAMEL__", to_camel_case(&manifest.id))
            .with("__MODULE_PASCAL__", to_pascal_case(&manifest.id))
    }

    /// The same tokens with values escaped for JSON string literals
    pub fn json_escaped(&self) -> Self {
        Self {
            tokens: self
                .tokens
                .iter()
                .map(|(token, value)| (token.clone(), json_escape(value)))
                .collect(),
        }
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.tokens
            .iter()
            .find(|(t, _)| t == token)
            .map(|(_, v)| v.as_str())
    }

    /// Replace every literal occurrence of every token
    pub fn render(&self, content: &str) -> String {
        self.tokens
            .iter()
            .fold(content.to_string(), |acc, (token, value)| {
                acc.replace(token.as_str(), value)
            })
    }

    /// Render bytes when they are text; `None` for binary content
    pub fn render_bytes(&self, bytes: &[u8]) -> Option<String> {
        if bytes.contains(&0) {
            return None;
        }
        std::str::from_utf8(bytes).ok().map(|text| self.render(text))
    }
}

fn json_escape(value: &str) -> String {
    let quoted = serde_json::Value::String(value.to_string()).to_string();
    quoted[1..quoted.len() - 1].to_string()
}

/// Admin route used when a manifest does not declare one
pub fn default_route(module_id: &str) -> String {
    format!("/app/dashboard/{module_id}")
}

/// Copies templates from a module root into a project root
#[derive(Debug)]
pub struct TemplateMaterializer<'a> {
    module_root: &'a Path,
    project_root: &'a Path,
    tokens: &'a TokenSet,
    dry_run: bool,
}

impl<'a> TemplateMaterializer<'a> {
    pub fn new(module_root: &'a Path, project_root: &'a Path, tokens: &'a TokenSet) -> Self {
        Self {
            module_root,
            project_root,
            tokens,
            dry_run: false,
        }
    }

    /// Report statuses without writing anything
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Materialize templates in order
    pub fn materialize_all(&self, templates: &[TemplateSpec]) -> Result<Vec<TemplateAction>> {
        let mut actions = Vec::with_capacity(templates.len());
        for template in templates {
            if template.from.is_empty() || template.to.is_empty() {
                continue;
            }
            let status = self.materialize(template)?;
            debug!("Template {} -> {}: {}", template.from, template.to, status);
            actions.push(TemplateAction {
                from: template.from.clone(),
                to: template.to.clone(),
                status,
            });
        }

        if !actions.is_empty() {
            info!("Materialized {} template(s)", actions.len());
        }
        Ok(actions)
    }

    /// Materialize one file or directory template
    pub fn materialize(&self, template: &TemplateSpec) -> Result<TemplateStatus> {
        let source = self.module_root.join(&template.from);
        let target = self.project_root.join(&template.to);

        if source.is_file() {
            return self.copy_file(&source, &target, template.overwrite);
        }
        if !source.is_dir() {
            return Err(Error::TemplateSourceMissing { path: source });
        }

        let mut copied = false;
        let mut overwritten = false;
        for entry in WalkDir::new(&source).sort_by_file_name() {
            let entry = entry.map_err(|e| Error::Io(e.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&source) else {
                continue;
            };
            match self.copy_file(entry.path(), &target.join(relative), template.overwrite)? {
                TemplateStatus::Copied => copied = true,
                TemplateStatus::Overwritten => overwritten = true,
                TemplateStatus::Skipped => {}
            }
        }

        if !self.dry_run {
            fs::create_dir_all(&target)?;
        }

        Ok(if copied {
            TemplateStatus::Copied
        } else if overwritten {
            TemplateStatus::Overwritten
        } else {
            TemplateStatus::Skipped
        })
    }

    fn copy_file(&self, source: &Path, target: &Path, overwrite: bool) -> Result<TemplateStatus> {
        let existed = target.exists();
        if existed && !overwrite {
            return Ok(TemplateStatus::Skipped);
        }

        if !self.dry_run {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            let bytes = fs::read(source)?;
            match self.tokens.render_bytes(&bytes) {
                Some(text) => fs::write(target, text)?,
                None => fs::write(target, bytes)?,
            }
        }

        Ok(if existed {
            TemplateStatus::Overwritten
        } else {
            TemplateStatus::Copied
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn manifest() -> ModuleManifest {
        serde_json::from_value(serde_json::json!({ "id": "pep-talk", "version": "1.2.0" })).unwrap()
    }

    #[test]
    fn test_tokens_for_manifest() {
        let tokens = TokenSet::for_manifest(&manifest());
        assert_eq!(tokens.get("__MODULE_LABEL__"), Some("Pep Talk"));
        assert_eq!(tokens.get("__MODULE_DESCRIPTION__"), Some("Pep Talk module."));
        assert_eq!(tokens.get("__MODULE_ROUTE__"), Some("/app/dashboard/pep-talk"));
        assert_eq!(
            tokens.render("export const __MODULE_CAMEL__ = '__MODULE_ID__@__MODULE_VERSION__'"),
            "export const pepTalk = 'pep-talk@1.2.0'"
        );
    }

    #[test]
    fn test_binary_content_is_not_rendered() {
        let tokens = TokenSet::for_manifest(&manifest());
        assert!(tokens.render_bytes(b"__MODULE_ID__\0").is_none());
        assert!(tokens.render_bytes(&[0xff, 0xfe]).is_none());
        assert_eq!(tokens.render_bytes(b"__MODULE_ID__").as_deref(), Some("pep-talk"));
    }

    #[test]
    fn test_file_statuses() {
        let module = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        fs::write(module.path().join("a.ts"), "id = '__MODULE_ID__'").unwrap();
        let tokens = TokenSet::for_manifest(&manifest());
        let materializer = TemplateMaterializer::new(module.path(), project.path(), &tokens);

        let keep = TemplateSpec { from: "a.ts".into(), to: "src/a.ts".into(), overwrite: false };
        assert_eq!(materializer.materialize(&keep).unwrap(), TemplateStatus::Copied);
        assert_eq!(
            fs::read_to_string(project.path().join("src/a.ts")).unwrap(),
            "id = 'pep-talk'"
        );
        assert_eq!(materializer.materialize(&keep).unwrap(), TemplateStatus::Skipped);

        let replace = TemplateSpec { overwrite: true, ..keep };
        assert_eq!(materializer.materialize(&replace).unwrap(), TemplateStatus::Overwritten);
    }

    #[test]
    fn test_directory_template() {
        let module = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        fs::create_dir_all(module.path().join("pages/nested")).unwrap();
        fs::write(module.path().join("pages/index.vue"), "<template/>").unwrap();
        fs::write(module.path().join("pages/nested/edit.vue"), "<template/>").unwrap();
        let tokens = TokenSet::new();
        let materializer = TemplateMaterializer::new(module.path(), project.path(), &tokens);

        let spec = TemplateSpec { from: "pages".into(), to: "app/pages/forms".into(), overwrite: false };
        assert_eq!(materializer.materialize(&spec).unwrap(), TemplateStatus::Copied);
        assert!(project.path().join("app/pages/forms/nested/edit.vue").is_file());
        assert_eq!(materializer.materialize(&spec).unwrap(), TemplateStatus::Skipped);
    }

    #[test]
    fn test_missing_source() {
        let module = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        let tokens = TokenSet::new();
        let materializer = TemplateMaterializer::new(module.path(), project.path(), &tokens);
        let spec = TemplateSpec { from: "nope".into(), to: "x".into(), overwrite: false };
        assert!(matches!(
            materializer.materialize(&spec),
            Err(Error::TemplateSourceMissing { .. })
        ));
    }

    #[test]
    fn test_dry_run_reports_without_writing() {
        let module = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        fs::write(module.path().join("a.ts"), "a").unwrap();
        let tokens = TokenSet::new();
        let materializer =
            TemplateMaterializer::new(module.path(), project.path(), &tokens).dry_run(true);
        let spec = TemplateSpec { from: "a.ts".into(), to: "a.ts".into(), overwrite: false };
        assert_eq!(materializer.materialize(&spec).unwrap(), TemplateStatus::Copied);
        assert!(!project.path().join("a.ts").exists());
    }
}
