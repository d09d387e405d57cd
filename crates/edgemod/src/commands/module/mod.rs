//! Module management commands
//!
//! Implements module management CLI commands:
//! - list: List modules declared in the workspace
//! - info: Show a module's manifest and install state
//! - add: Install a module into the project
//! - upgrade: Re-install an installed module at the workspace version
//! - remove: Remove a module from the project registries
//! - validate: Check registries against install receipts
//! - doctor: Diagnose module drift
//! - new: Scaffold a new module package

mod add;
mod common;
mod doctor;
mod info;
mod list;
mod new;
mod remove;
mod upgrade;
mod validate;

use anyhow::Result;
use edgemod_core::config::SettingsOverrides;

use crate::cli::ModuleCommands;

/// Main entry point for module subcommands
pub fn run(cmd: ModuleCommands, overrides: SettingsOverrides) -> Result<()> {
    match cmd {
        ModuleCommands::List(args) => list::run(args, overrides),
        ModuleCommands::Info(args) => info::run(args, overrides),
        ModuleCommands::Add(args) => add::run(args, overrides),
        ModuleCommands::Upgrade(args) => upgrade::run(args, overrides),
        ModuleCommands::Remove(args) => remove::run(args, overrides),
        ModuleCommands::Validate(args) => validate::run(args, overrides),
        ModuleCommands::Doctor(args) => doctor::run(args, overrides),
        ModuleCommands::New(args) => new::run(args, overrides),
    }
}
