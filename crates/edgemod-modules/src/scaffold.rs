//! New module package scaffolding from the embedded starter template

use edgemod_core::utils::{is_valid_module_id, normalize_path, to_module_label};
use edgemod_core::{Error, Result};
use rust_embed::RustEmbed;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::templates::{default_route, TokenSet};

#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/templates/module-starter/"]
struct StarterTemplate;

/// Package name scope used when none is given
pub const DEFAULT_PACKAGE_SCOPE: &str = "@edgedev";

/// Starting version of a new module
pub const DEFAULT_MODULE_VERSION: &str = "0.1.0";

#[derive(Debug, Clone, Default)]
pub struct CreateModuleOptions {
    pub module_id: String,
    pub workspace_root: PathBuf,
    /// Target directory; relative paths resolve against the workspace root
    pub output_dir: Option<PathBuf>,
    pub label: Option<String>,
    pub description: Option<String>,
    pub version: Option<String>,
    pub package_name: Option<String>,
    pub route: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedModule {
    pub module_root: PathBuf,
    pub module_id: String,
    pub package_name: String,
}

/// `module-<id>`, unless the id already carries the prefix
pub fn module_dir_name(module_id: &str) -> String {
    if module_id.starts_with("module-") {
        module_id.to_string()
    } else {
        format!("module-{module_id}")
    }
}

/// Scaffold a module package. Refuses to write into an existing directory.
pub fn create_module_package(options: CreateModuleOptions) -> Result<CreatedModule> {
    let id = options.module_id.as_str();
    if !is_valid_module_id(id) {
        return Err(Error::InvalidModuleId { id: id.to_string() });
    }

    let dir_name = module_dir_name(id);
    let module_root = match &options.output_dir {
        Some(dir) => normalize_path(&options.workspace_root.join(dir)),
        None => options.workspace_root.join("packages").join(&dir_name),
    };
    if module_root.exists() {
        return Err(Error::TargetExists { path: module_root });
    }

    let label = options.label.unwrap_or_else(|| to_module_label(id));
    let description = options
        .description
        .unwrap_or_else(|| format!("{label} module."));
    let package_name = options
        .package_name
        .unwrap_or_else(|| format!("{DEFAULT_PACKAGE_SCOPE}/{dir_name}"));

    let tokens = TokenSet::new()
        .with("__MODULE_ID__", id)
        .with(
            "__MODULE_VERSION__",
            options.version.as_deref().unwrap_or(DEFAULT_MODULE_VERSION),
        )
        .with("__MODULE_LABEL__", label)
        .with("__MODULE_DESCRIPTION__", description)
        .with("__MODULE_PACKAGE_NAME__", package_name.as_str())
        .with(
            "__MODULE_ROUTE__",
            options.route.unwrap_or_else(|| default_route(id)),
        )
        .with("__MODULE_CAMEL__", edgemod_core::utils::to_camel_case(id))
        .with("__MODULE_PASCAL__", edgemod_core::utils::to_pascal_case(id));

    write_starter(&module_root, &tokens)?;
    info!("Created module {} at {}", id, module_root.display());

    Ok(CreatedModule {
        module_root,
        module_id: id.to_string(),
        package_name,
    })
}

fn write_starter(module_root: &Path, tokens: &TokenSet) -> Result<()> {
    let json_tokens = tokens.json_escaped();
    for file in StarterTemplate::iter() {
        let Some(content) = StarterTemplate::get(&file) else {
            continue;
        };
        let dest = module_root.join(file.as_ref());
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        let file_tokens = if file.ends_with(".json") {
            &json_tokens
        } else {
            tokens
        };
        match file_tokens.render_bytes(content.data.as_ref()) {
            Some(text) => fs::write(&dest, text)?,
            None => fs::write(&dest, content.data.as_ref())?,
        }
        debug!("Wrote {}", dest.display());
    }
    Ok(())
}
