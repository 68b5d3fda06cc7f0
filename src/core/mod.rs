//! VideoStat Core Engine
//!
//! Handles the project registry, footage scanning, statistics aggregation,
//! public export building, and source-control publishing.

pub mod config;
pub mod export;
pub mod fs;
pub mod publish;
pub mod scan;
pub mod service;
pub mod stats;

// Re-export common types
mod types;
pub use types::*;

mod error;
pub use error::*;
