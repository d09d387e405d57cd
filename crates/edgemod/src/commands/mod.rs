//! Command implementations

pub mod module;
