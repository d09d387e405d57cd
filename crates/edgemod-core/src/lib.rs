//! # edgemod-core
//!
//! Core library for edgemod providing:
//! - Module manifest, receipt and project type definitions
//! - Embedded JSON Schema validation for module manifests
//! - Naming derivations shared by templates and registries
//! - Layered installer configuration (defaults, sentinel file, environment, flags)

pub mod config;
pub mod error;
pub mod schema;
pub mod types;
pub mod utils;

pub use config::{InstallerSettings, ProjectConfig};
pub use error::{Error, Result};
pub use schema::SchemaValidator;
