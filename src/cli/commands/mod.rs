//! CLI command implementations.

pub mod client;
