//! CLI command implementations.

pub mod common;
pub mod encoding;
pub mod fidelity;
pub mod idle;
pub mod sweep;
pub mod version;
