//! Declarative project patches
//!
//! Two kinds are supported, both idempotent: `json-merge` deep-merges an
//! object into a JSON document, `marker-insert` splices text between a pair
//! of marker comments. Patches run in declaration order and the first failure
//! aborts the rest; patches already applied stay applied.

mod json_merge;
mod marker_insert;

pub use json_merge::{apply_json_merge, merge_json_values};
pub use marker_insert::apply_marker_insert;

use edgemod_core::types::{PatchAction, PatchKind, PatchSpec, PatchStatus};
use edgemod_core::Result;
use std::path::Path;
use tracing::{debug, info};

/// Where patches read from and write to
#[derive(Debug, Clone, Copy)]
pub struct PatchContext<'a> {
    /// Module package root (source of `source` files)
    pub module_root: &'a Path,
    /// Target project root (base of `target` paths)
    pub project_root: &'a Path,
    /// Compute statuses without writing
    pub dry_run: bool,
}

/// Apply one patch
pub fn apply_patch(ctx: &PatchContext<'_>, patch: &PatchSpec) -> Result<PatchStatus> {
    match patch.patch_kind()? {
        PatchKind::JsonMerge => apply_json_merge(ctx, patch),
        PatchKind::MarkerInsert => apply_marker_insert(ctx, patch),
    }
}

/// Apply patches in order, stopping at the first error
pub fn apply_patches(ctx: &PatchContext<'_>, patches: &[PatchSpec]) -> Result<Vec<PatchAction>> {
    let mut actions = Vec::with_capacity(patches.len());

    for patch in patches {
        let status = apply_patch(ctx, patch)?;
        debug!("Patch {} {} -> {}", patch.kind, patch.target, status);
        actions.push(PatchAction {
            kind: patch.kind.clone(),
            target: patch.target.clone(),
            status,
        });
    }

    if !actions.is_empty() {
        info!("Applied {} patch(es)", actions.len());
    }
    Ok(actions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use edgemod_core::Error;
    use std::fs;
    use tempfile::TempDir;

    fn patch(value: serde_json::Value) -> PatchSpec {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_unknown_type_aborts_remaining_patches() {
        let temp = TempDir::new().unwrap();
        let ctx = PatchContext {
            module_root: temp.path(),
            project_root: temp.path(),
            dry_run: false,
        };

        let patches = vec![
            patch(serde_json::json!({
                "type": "json-merge",
                "target": "first.json",
                "createIfMissing": true,
                "merge": { "a": 1 }
            })),
            patch(serde_json::json!({ "type": "yaml-merge", "target": "x.yaml" })),
            patch(serde_json::json!({
                "type": "json-merge",
                "target": "third.json",
                "createIfMissing": true,
                "merge": { "b": 1 }
            })),
        ];

        let err = apply_patches(&ctx, &patches).unwrap_err();
        assert!(matches!(err, Error::UnknownPatchType { .. }));
        assert!(temp.path().join("first.json").exists());
        assert!(!temp.path().join("third.json").exists());
    }

    #[test]
    fn test_actions_record_type_target_and_status() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("app.ts"), "// EDGE MODULE NAV START\n// EDGE MODULE NAV END\n").unwrap();
        let ctx = PatchContext {
            module_root: temp.path(),
            project_root: temp.path(),
            dry_run: false,
        };

        let actions = apply_patches(
            &ctx,
            &[patch(serde_json::json!({
                "type": "marker-insert",
                "target": "app.ts",
                "marker": "NAV",
                "content": "nav.push('forms')"
            }))],
        )
        .unwrap();

        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].kind, "marker-insert");
        assert_eq!(actions[0].target, "app.ts");
        assert_eq!(actions[0].status, PatchStatus::Inserted);
    }
}
