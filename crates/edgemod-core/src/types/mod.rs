//! Type definitions for module manifests and install receipts

mod manifest_types;
mod receipt_types;

pub use manifest_types::*;
pub use receipt_types::*;
