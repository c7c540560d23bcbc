//! CLI command implementations.

pub mod common;
pub mod controlled;
pub mod network;
pub mod oracle;
pub mod version;
