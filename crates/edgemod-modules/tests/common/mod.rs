//! Common test utilities for edgemod-modules
//!
//! This module provides shared test infrastructure including:
//! - Workspace and project fixtures on temporary directories
//! - Manifest constants used across lifecycle tests
//! - A recording package-manager runner

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod constants;
pub mod fixtures;
pub mod mocks;

pub use constants::*;
pub use fixtures::*;
pub use mocks::*;
