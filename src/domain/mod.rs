//! Domain layer for the download client store
//!
//! Models, errors and the repository port the adapters implement.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
