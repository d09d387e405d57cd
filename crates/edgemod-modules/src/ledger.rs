//! Version ledger (`.edge/modules/registry.ts`)
//!
//! Holds `"<id>": "<version>",` entries inside the REGISTRY marker block,
//! sorted by id on every write.

use edgemod_core::config::{ProjectLayout, REGISTRY_MARKER};
use edgemod_core::types::{RegistryEntry, RegistryUpdate};
use edgemod_core::{Error, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::markers::{EntryValue, MarkedDocument, MarkerPair};

/// Content of a newly created version ledger
pub const VERSION_LEDGER_TEMPLATE: &str = "export const edgeModuleRegistry = {\n  // EDGE MODULE REGISTRY START\n  // EDGE MODULE REGISTRY END\n};\n";

/// Write `rendered` unless it matches `original`. Returns whether it changed.
pub(crate) fn write_if_changed(
    path: &Path,
    original: Option<&str>,
    rendered: &str,
    dry_run: bool,
) -> Result<bool> {
    if original == Some(rendered) {
        return Ok(false);
    }
    if !dry_run {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, rendered)?;
        debug!("Wrote {}", path.display());
    }
    Ok(true)
}

/// The project's module version ledger
#[derive(Debug, Clone)]
pub struct VersionLedger {
    path: PathBuf,
}

impl VersionLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn for_project(layout: &ProjectLayout) -> Self {
        Self::new(layout.version_ledger())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn markers() -> MarkerPair {
        MarkerPair::named(REGISTRY_MARKER)
    }

    fn markers_error(&self) -> Error {
        let markers = Self::markers();
        Error::markers_not_found(self.path.display().to_string(), markers.start, markers.end)
    }

    /// Current file content, or `None` when the ledger does not exist
    fn read_raw(&self) -> Result<Option<String>> {
        if self.exists() {
            Ok(Some(fs::read_to_string(&self.path)?))
        } else {
            Ok(None)
        }
    }

    /// Installed versions by module id. A missing file reads as empty;
    /// a file without its markers is an error.
    pub fn read_versions(&self) -> Result<BTreeMap<String, String>> {
        let Some(raw) = self.read_raw()? else {
            return Ok(BTreeMap::new());
        };
        let doc = MarkedDocument::parse(&raw);
        let range = doc
            .find_block(&Self::markers())
            .ok_or_else(|| self.markers_error())?;

        Ok(doc
            .read_entries(range)
            .into_iter()
            .filter_map(|(id, value)| match value {
                EntryValue::Literal(version) => Some((id, version)),
                EntryValue::Identifier(_) => None,
            })
            .collect())
    }

    /// Set the version recorded for a module, creating the ledger if needed
    pub fn upsert(&self, module_id: &str, version: &str, dry_run: bool) -> Result<RegistryUpdate> {
        let raw = self.read_raw()?;
        let mut doc = MarkedDocument::parse(raw.as_deref().unwrap_or(VERSION_LEDGER_TEMPLATE));
        let range = doc
            .find_block(&Self::markers())
            .ok_or_else(|| self.markers_error())?;

        let mut entries = doc.read_entries(range);
        entries.insert(
            module_id.to_string(),
            EntryValue::Literal(version.to_string()),
        );
        doc.write_entries(range, &entries);

        let changed = write_if_changed(&self.path, raw.as_deref(), &doc.render(), dry_run)?;
        Ok(RegistryUpdate {
            path: self.path.clone(),
            entry: RegistryEntry {
                id: module_id.to_string(),
                version: version.to_string(),
            },
            changed,
        })
    }

    /// Drop a module's entry. Returns whether an entry was removed.
    pub fn remove(&self, module_id: &str, dry_run: bool) -> Result<bool> {
        let Some(raw) = self.read_raw()? else {
            return Ok(false);
        };
        let mut doc = MarkedDocument::parse(&raw);
        let range = doc
            .find_block(&Self::markers())
            .ok_or_else(|| self.markers_error())?;

        let mut entries = doc.read_entries(range);
        if entries.remove(module_id).is_none() {
            return Ok(false);
        }
        doc.write_entries(range, &entries);
        write_if_changed(&self.path, Some(&raw), &doc.render(), dry_run)
    }
}
