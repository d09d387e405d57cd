//! Manifests and file contents shared by the integration tests

#![allow(dead_code)]

use serde_json::{json, Value};

/// Module id used by most lifecycle tests
pub const PEP_TALK_ID: &str = "pep-talk";

/// Project directory relative to the workspace root
pub const PROJECT_DIR: &str = "apps/site";

pub const WIDGET_TEMPLATE: &str = "<template>\n  <div>__MODULE_LABEL__ (__MODULE_VERSION__)</div>\n</template>\n";

pub const RUNTIME_ENTRY: &str =
    "export const edgeModule = { id: '__MODULE_ID__', route: '__MODULE_ROUTE__' }\n";

pub const PLUGINS_FILE: &str =
    "export const plugins = [\n  // EDGE MODULE PLUGINS START\n  // EDGE MODULE PLUGINS END\n]\n";

/// One dependency, one template, one creating json-merge, a runtime entry
pub fn pep_talk_manifest(version: &str) -> Value {
    json!({
        "id": PEP_TALK_ID,
        "version": version,
        "label": "Pep Talk",
        "dependencies": [{ "name": "zod", "version": "^3.22.0" }],
        "templates": [
            { "from": "templates/widget.vue", "to": "components/PepTalkWidget.vue" }
        ],
        "patches": [
            {
                "type": "json-merge",
                "target": "config/edge.json",
                "createIfMissing": true,
                "merge": { "modules": { "pep-talk": { "enabled": true } } }
            }
        ],
        "runtime": {
            "entry": "runtime/edge-module.ts",
            "target": "edge-modules/pep-talk.ts"
        }
    })
}

/// Files of the pep-talk module package
pub fn pep_talk_files() -> Vec<(&'static str, &'static str)> {
    vec![
        ("templates/widget.vue", WIDGET_TEMPLATE),
        ("runtime/edge-module.ts", RUNTIME_ENTRY),
    ]
}

/// A module with no dependencies or runtime section
pub fn plain_manifest(id: &str, version: &str) -> Value {
    json!({ "id": id, "version": version })
}
