//! In-memory caching layer for hot-path repository reads.
//!
//! The cache is owned by the repository that populates it; there is no
//! process-wide instance.

pub mod client_cache;

pub use client_cache::ClientCache;
