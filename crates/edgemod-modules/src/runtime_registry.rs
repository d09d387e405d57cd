//! Runtime registry (`edge-modules/registry.ts`)
//!
//! Wires installed modules into the host application. The IMPORTS block holds
//! one import statement per module and the REGISTRY block maps module ids to
//! the imported identifiers.

use edgemod_core::config::{ProjectLayout, IMPORTS_MARKER, REGISTRY_MARKER};
use edgemod_core::types::{ModuleManifest, RuntimeEntry, RuntimeRegistryUpdate};
use edgemod_core::utils::{relative_path, to_module_identifier, to_posix};
use edgemod_core::{Error, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::ledger::write_if_changed;
use crate::markers::{BlockRange, EntryValue, MarkedDocument, MarkerPair};

/// Content of a newly created runtime registry
pub const RUNTIME_REGISTRY_TEMPLATE: &str = "import type { EdgeModuleManifest } from '~/lib/edge-modules/types';\n\n// EDGE MODULE IMPORTS START\n// EDGE MODULE IMPORTS END\n\nexport const edgeModuleRegistry: Record<string, EdgeModuleManifest> = {\n  // EDGE MODULE REGISTRY START\n  // EDGE MODULE REGISTRY END\n};\n";

/// `import { <export> as <identifier> } from '<path>';`
pub fn import_line(export: &str, identifier: &str, import_path: &str) -> String {
    format!("import {{ {export} as {identifier} }} from '{import_path}';")
}

/// The project's runtime registry file
#[derive(Debug, Clone)]
pub struct RuntimeRegistry {
    path: PathBuf,
}

impl RuntimeRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn for_project(layout: &ProjectLayout) -> Self {
        Self::new(layout.runtime_registry())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Module specifier for a runtime target, relative to the registry's
    /// directory, POSIX-separated, without the file extension.
    pub fn import_path(&self, project_root: &Path, target: &str) -> String {
        let registry_dir = self.path.parent().unwrap_or(project_root);
        let relative = to_posix(&relative_path(registry_dir, &project_root.join(target)));
        let prefixed = if relative.starts_with('.') {
            relative
        } else {
            format!("./{relative}")
        };
        strip_extension(&prefixed)
    }

    fn find(&self, doc: &MarkedDocument, marker: &str) -> Result<BlockRange> {
        let pair = MarkerPair::named(marker);
        doc.find_block(&pair).ok_or_else(|| {
            Error::markers_not_found(self.path.display().to_string(), pair.start, pair.end)
        })
    }

    fn read_raw(&self) -> Result<Option<String>> {
        if self.exists() {
            Ok(Some(fs::read_to_string(&self.path)?))
        } else {
            Ok(None)
        }
    }

    /// Identifiers by module id. A missing file reads as empty.
    pub fn read_identifiers(&self) -> Result<BTreeMap<String, String>> {
        let Some(raw) = self.read_raw()? else {
            return Ok(BTreeMap::new());
        };
        let doc = MarkedDocument::parse(&raw);
        let range = self.find(&doc, REGISTRY_MARKER)?;
        Ok(doc
            .read_entries(range)
            .into_iter()
            .filter_map(|(id, value)| match value {
                EntryValue::Identifier(ident) => Some((id, ident)),
                EntryValue::Literal(_) => None,
            })
            .collect())
    }

    /// Add a module's import and mapping entry. Manifests without a runtime
    /// section leave the registry untouched and return `None`.
    pub fn upsert(
        &self,
        project_root: &Path,
        manifest: &ModuleManifest,
        dry_run: bool,
    ) -> Result<Option<RuntimeRegistryUpdate>> {
        let Some(runtime) = manifest.runtime.as_ref().filter(|r| !r.target.is_empty()) else {
            return Ok(None);
        };

        let raw = self.read_raw()?;
        let mut doc = MarkedDocument::parse(raw.as_deref().unwrap_or(RUNTIME_REGISTRY_TEMPLATE));

        let identifier = to_module_identifier(&manifest.id);
        let import_path = self.import_path(project_root, &runtime.target);
        let line = import_line(runtime.export_name(), &identifier, &import_path);

        // A changed target or export leaves a stale import for the identifier
        let needle = format!(" as {identifier} }}");
        let imports = self.find(&doc, IMPORTS_MARKER)?;
        doc.remove_block_lines(imports, |l| l.contains(&needle) && l.trim() != line);
        let imports = self.find(&doc, IMPORTS_MARKER)?;
        if !doc.block_text(imports).contains(&line) {
            doc.insert_lines(imports.end, vec![line]);
        }

        let mapping = self.find(&doc, REGISTRY_MARKER)?;
        let mut entries = doc.read_entries(mapping);
        entries.insert(
            manifest.id.clone(),
            EntryValue::Identifier(identifier.clone()),
        );
        doc.write_entries(mapping, &entries);

        let changed = write_if_changed(&self.path, raw.as_deref(), &doc.render(), dry_run)?;
        debug!("Runtime registry entry {} -> {}", manifest.id, identifier);

        Ok(Some(RuntimeRegistryUpdate {
            path: self.path.clone(),
            entry: RuntimeEntry {
                id: manifest.id.clone(),
                identifier,
                import_path,
            },
            changed,
        }))
    }

    /// Drop a module's mapping entry and import line. Returns whether the
    /// file changed.
    pub fn remove(&self, module_id: &str, dry_run: bool) -> Result<bool> {
        let Some(raw) = self.read_raw()? else {
            return Ok(false);
        };
        let mut doc = MarkedDocument::parse(&raw);

        let mapping = self.find(&doc, REGISTRY_MARKER)?;
        let mut entries = doc.read_entries(mapping);
        let identifier = match entries.remove(module_id) {
            Some(value) => value.as_str().to_string(),
            None => to_module_identifier(module_id),
        };
        doc.write_entries(mapping, &entries);

        let imports = self.find(&doc, IMPORTS_MARKER)?;
        let needle = format!(" as {identifier} }}");
        doc.remove_block_lines(imports, |line| line.contains(&needle));

        write_if_changed(&self.path, Some(&raw), &doc.render(), dry_run)
    }
}

/// Strip the extension of the final path segment (dotfiles keep their name)
fn strip_extension(path: &str) -> String {
    let segment_start = path.rfind('/').map(|i| i + 1).unwrap_or(0);
    match path[segment_start..].rfind('.') {
        Some(dot) if dot > 0 => path[..segment_start + dot].to_string(),
        _ => path.to_string(),
    }
}
