//! Version analysis for installs and upgrades
//!
//! Platform compatibility ranges are written npm-style
//! (`>=1.0.0 <2.0.0`, `^1.2 || ^2.0`) and versions are coerced leniently
//! (`2`, `2.1`, `v2.1.0`).

use edgemod_core::types::{BreakingChange, ModuleManifest, UpgradeRecord};
use edgemod_core::{Error, Result};
use regex::Regex;
use semver::{Version, VersionReq};
use std::sync::LazyLock;
use tracing::{debug, warn};

static VERSION_CORE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)(?:\.(\d+))?(?:\.(\d+))?").expect("version regex is valid")
});

/// Parse a version, falling back to the first `major[.minor[.patch]]` found
pub fn coerce_version(input: &str) -> Option<Version> {
    let trimmed = input.trim().trim_start_matches(['v', '=']);
    if let Ok(version) = Version::parse(trimmed) {
        return Some(version);
    }

    let caps = VERSION_CORE.captures(trimmed)?;
    let part = |i: usize| -> Option<u64> {
        caps.get(i)
            .map(|m| m.as_str().parse().ok())
            .unwrap_or(Some(0))
    };
    Some(Version::new(part(1)?, part(2)?, part(3)?))
}

/// Parse an npm-style range into alternatives (any one must match)
pub fn parse_platform_range(range: &str) -> Option<Vec<VersionReq>> {
    let mut alternatives = Vec::new();

    for alternative in range.split("||") {
        let mut comparators: Vec<String> = Vec::new();
        let mut pending_op: Option<&str> = None;

        for token in alternative.split_whitespace() {
            if token.chars().all(|c| matches!(c, '<' | '>' | '=' | '~' | '^')) {
                pending_op = Some(token);
                continue;
            }
            let comparator = match pending_op.take() {
                Some(op) => format!("{op}{token}"),
                None => token.to_string(),
            };
            comparators.push(comparator.trim_end_matches(',').to_string());
        }

        let joined = if comparators.is_empty() {
            "*".to_string()
        } else {
            comparators.join(", ")
        };
        alternatives.push(VersionReq::parse(&joined).ok()?);
    }

    Some(alternatives)
}

/// Fail when the project's platform version is outside the manifest's
/// declared compatibility range. Missing data on either side passes.
pub fn check_compatibility(manifest: &ModuleManifest, platform_version: Option<&str>) -> Result<()> {
    let Some(range) = manifest
        .compatibility
        .as_ref()
        .and_then(|c| c.platform.as_deref())
    else {
        return Ok(());
    };
    let Some(platform_version) = platform_version else {
        debug!("Project declares no platformVersion; skipping compatibility check");
        return Ok(());
    };

    let Some(version) = coerce_version(platform_version) else {
        warn!("Unrecognised platformVersion '{}'; skipping compatibility check", platform_version);
        return Ok(());
    };
    let Some(requirements) = parse_platform_range(range) else {
        warn!("Unrecognised compatibility range '{}' for {}", range, manifest.id);
        return Ok(());
    };

    if requirements.iter().any(|req| req.matches(&version)) {
        Ok(())
    } else {
        Err(Error::IncompatiblePlatform {
            id: manifest.id.clone(),
            range: range.to_string(),
            platform_version: platform_version.to_string(),
        })
    }
}

/// Breaking changes with `from < version <= to`
pub fn breaking_changes_between(
    manifest: &ModuleManifest,
    from_version: &str,
    to_version: &str,
) -> Vec<BreakingChange> {
    let (Some(from), Some(to)) = (coerce_version(from_version), coerce_version(to_version)) else {
        return Vec::new();
    };

    manifest
        .breaking_changes
        .iter()
        .filter(|change| {
            coerce_version(&change.version)
                .is_some_and(|version| version > from && version <= to)
        })
        .cloned()
        .collect()
}

/// Upgrade record for a reinstall over a different recorded version
pub fn upgrade_record(manifest: &ModuleManifest, previous_version: &str) -> Option<UpgradeRecord> {
    if previous_version == manifest.version {
        return None;
    }

    let breaking_changes = breaking_changes_between(manifest, previous_version, &manifest.version);
    for change in &breaking_changes {
        warn!(
            "Breaking change in {} {}: {}",
            manifest.id, change.version, change.description
        );
    }

    Some(UpgradeRecord {
        from_version: previous_version.to_string(),
        to_version: manifest.version.clone(),
        breaking_changes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn manifest(extra: serde_json::Value) -> ModuleManifest {
        let mut base = json!({ "id": "forms", "version": "2.1.0" });
        if let (Some(b), Some(e)) = (base.as_object_mut(), extra.as_object()) {
            b.extend(e.clone());
        }
        serde_json::from_value(base).unwrap()
    }

    #[test]
    fn test_coerce_version() {
        assert_eq!(coerce_version("2"), Some(Version::new(2, 0, 0)));
        assert_eq!(coerce_version("v2.1"), Some(Version::new(2, 1, 0)));
        assert_eq!(coerce_version("1.4.2"), Some(Version::new(1, 4, 2)));
        assert_eq!(coerce_version("1.0.0-beta.1").unwrap().pre.as_str(), "beta.1");
        assert_eq!(coerce_version("latest"), None);
    }

    #[test]
    fn test_npm_style_ranges() {
        let reqs = parse_platform_range(">=1.0.0 <2.0.0").unwrap();
        assert!(reqs[0].matches(&Version::new(1, 5, 0)));
        assert!(!reqs[0].matches(&Version::new(2, 0, 0)));

        let reqs = parse_platform_range("^1.2 || ^3.0").unwrap();
        assert_eq!(reqs.len(), 2);

        let reqs = parse_platform_range(">= 1.0.0").unwrap();
        assert!(reqs[0].matches(&Version::new(1, 0, 0)));

        assert!(parse_platform_range(">=banana").is_none());
    }

    #[test]
    fn test_check_compatibility() {
        let m = manifest(json!({ "compatibility": { "platform": ">=1.0.0 <2.0.0" } }));
        assert!(check_compatibility(&m, Some("1.3")).is_ok());
        assert!(check_compatibility(&m, None).is_ok());

        let err = check_compatibility(&m, Some("2.0.0")).unwrap_err();
        assert!(matches!(err, Error::IncompatiblePlatform { .. }));
        assert!(err.to_string().contains(">=1.0.0 <2.0.0"));
    }

    #[test]
    fn test_breaking_changes_window() {
        let m = manifest(json!({
            "breakingChanges": [
                { "version": "1.0.0", "description": "old" },
                { "version": "2.0.0", "description": "renamed config key" },
                { "version": "2.1.0", "description": "new route" },
                { "version": "3.0.0", "description": "future" }
            ]
        }));
        let changes = breaking_changes_between(&m, "1.0.0", "2.1.0");
        let versions: Vec<&str> = changes.iter().map(|c| c.version.as_str()).collect();
        assert_eq!(versions, vec!["2.0.0", "2.1.0"]);
    }

    #[test]
    fn test_upgrade_record_only_on_version_change() {
        let m = manifest(json!({}));
        assert!(upgrade_record(&m, "2.1.0").is_none());
        let record = upgrade_record(&m, "1.0.0").unwrap();
        assert_eq!(record.from_version, "1.0.0");
        assert_eq!(record.to_version, "2.1.0");
    }
}
