//! Project layout, sentinel file parsing and layered installer settings

mod layout;
mod project;
mod settings;

pub use layout::*;
pub use project::ProjectConfig;
pub use settings::{InstallerSettings, SettingsOverrides};
