//! `marker-insert` patches

use edgemod_core::types::{InsertPosition, PatchSpec, PatchStatus};
use edgemod_core::{Error, Result};
use std::fs;
use tracing::debug;

use super::PatchContext;
use crate::markers::{MarkedDocument, MarkerPair};

fn resolve_markers(patch: &PatchSpec) -> Result<MarkerPair> {
    let named = patch
        .marker
        .as_deref()
        .filter(|m| !m.is_empty())
        .map(MarkerPair::named);
    let start = patch.start_marker.as_deref().filter(|m| !m.is_empty());
    let end = patch.end_marker.as_deref().filter(|m| !m.is_empty());

    match (named, start, end) {
        (_, Some(start), Some(end)) => Ok(MarkerPair::new(start, end)),
        (Some(pair), start, end) => Ok(MarkerPair::new(
            start.map(str::to_string).unwrap_or(pair.start),
            end.map(str::to_string).unwrap_or(pair.end),
        )),
        _ => Err(Error::PatchMarkersUndeclared {
            target: patch.target.clone(),
        }),
    }
}

fn resolve_content(ctx: &PatchContext<'_>, patch: &PatchSpec) -> Result<String> {
    if let Some(content) = patch.content.as_deref().filter(|c| !c.is_empty()) {
        return Ok(content.to_string());
    }

    if let Some(source) = patch.source.as_deref().filter(|s| !s.is_empty()) {
        let source_path = ctx.module_root.join(source);
        if source_path.is_file() {
            let content = fs::read_to_string(&source_path)?;
            if !content.is_empty() {
                return Ok(content);
            }
        }
    }

    Err(Error::PatchContentMissing {
        target: patch.target.clone(),
    })
}

/// Insert the patch content between the target's markers unless the trimmed
/// content already appears there.
pub fn apply_marker_insert(ctx: &PatchContext<'_>, patch: &PatchSpec) -> Result<PatchStatus> {
    let target_path = ctx.project_root.join(&patch.target);
    if !target_path.is_file() {
        return Err(Error::patch_target_missing("Marker insert", &patch.target));
    }

    let markers = resolve_markers(patch)?;
    let content = resolve_content(ctx, patch)?.replace("\r\n", "\n");

    let mut doc = MarkedDocument::parse(&fs::read_to_string(&target_path)?);
    let range = doc
        .find_block(&markers)
        .ok_or_else(|| Error::markers_not_found(&patch.target, &markers.start, &markers.end))?;

    if doc.block_text(range).contains(content.trim()) {
        return Ok(PatchStatus::Skipped);
    }

    let insert: Vec<String> = content.trim_end().split('\n').map(str::to_string).collect();
    let index = match patch.insert_position {
        InsertPosition::Before => range.inner_start(),
        InsertPosition::After => range.end,
    };
    doc.insert_lines(index, insert);

    if !ctx.dry_run {
        fs::write(&target_path, doc.render())?;
        debug!("Inserted content into {}", target_path.display());
    }

    Ok(PatchStatus::Inserted)
}
