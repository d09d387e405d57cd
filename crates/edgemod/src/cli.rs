//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use edgemod_core::config::SettingsOverrides;
use edgemod_doctor::OutputFormat;

/// edgemod - Install and validate workspace modules in edge projects
#[derive(Parser, Debug)]
#[command(name = "edgemod")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Target project root (default: current directory)
    #[arg(long, global = true, env = "EDGE_TARGET_PROJECT_ROOT")]
    pub project_root: Option<Utf8PathBuf>,

    /// Workspace root holding module packages
    #[arg(long, global = true, env = "EDGE_MODULE_WORKSPACE_ROOT")]
    pub workspace_root: Option<Utf8PathBuf>,

    /// Package manager used to install module dependencies
    #[arg(long, global = true, env = "EDGE_PACKAGE_MANAGER")]
    pub package_manager: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Flag values layered over the sentinel file and environment
    pub fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            project_root: self.project_root.clone().map(Utf8PathBuf::into_std_path_buf),
            workspace_root: self
                .workspace_root
                .clone()
                .map(Utf8PathBuf::into_std_path_buf),
            package_manager: self.package_manager.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Module management
    #[command(subcommand)]
    Module(ModuleCommands),
}

// Module commands
#[derive(Subcommand, Debug)]
pub enum ModuleCommands {
    /// List modules available in the workspace
    List(ModuleListArgs),

    /// Show module information
    Info(ModuleInfoArgs),

    /// Install a module into the project
    Add(ModuleAddArgs),

    /// Upgrade an installed module to the workspace version
    Upgrade(ModuleUpgradeArgs),

    /// Remove a module from the project registries
    Remove(ModuleRemoveArgs),

    /// Check the project registries against install receipts
    Validate(ModuleValidateArgs),

    /// Diagnose module drift in the project
    Doctor(ModuleDoctorArgs),

    /// Scaffold a new module package
    New(ModuleNewArgs),
}

#[derive(Args, Debug)]
pub struct ModuleListArgs {
    /// Show installed modules only
    #[arg(long)]
    pub installed: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ModuleInfoArgs {
    /// Module id
    pub id: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ModuleAddArgs {
    /// Module id
    pub id: String,

    /// Show what would change without writing files or installing dependencies
    #[arg(long)]
    pub dry_run: bool,

    /// Print the install receipt as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ModuleUpgradeArgs {
    /// Module id
    pub id: String,

    /// Show what would change without writing files or installing dependencies
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct ModuleRemoveArgs {
    /// Module id
    pub id: String,

    /// Show what would change without writing files
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct ModuleValidateArgs {
    /// Output format (human, json, yaml)
    #[arg(long, default_value = "human")]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct ModuleDoctorArgs {
    /// Output format (human, json, yaml)
    #[arg(long, default_value = "human")]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct ModuleNewArgs {
    /// Module id (lowercase letters, digits and dashes)
    pub id: String,

    /// Display label
    #[arg(long)]
    pub label: Option<String>,

    /// Module description
    #[arg(long)]
    pub description: Option<String>,

    /// Initial module version
    #[arg(long)]
    pub version: Option<String>,

    /// npm package name (default: @edgedev/module-<id>)
    #[arg(long)]
    pub package_name: Option<String>,

    /// Route the module serves
    #[arg(long)]
    pub route: Option<String>,

    /// Output directory (default: <workspace>/packages/module-<id>)
    #[arg(long)]
    pub output_dir: Option<Utf8PathBuf>,
}
