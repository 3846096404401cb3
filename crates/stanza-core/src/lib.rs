//! Core types and utilities for the Stanza packaging toolchain.
//!
//! This crate provides foundational pieces used throughout Stanza:
//! - Coded error types with fix suggestions
//! - High-performance JSON operations
//! - Common concurrent-collection re-exports

pub mod error;
mod json;

pub use error::{Error, Result};
pub use json::{from_json, from_json_slice, to_json, to_json_pretty};

// Re-export commonly used types
pub use ahash::{AHashMap, AHashSet};
pub use parking_lot::{Mutex, RwLock};

/// Global allocator using mimalloc for high performance.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;
