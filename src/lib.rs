//! VideoStat Core Library
//!
//! Data core for the VideoStat desktop utility: shooting-project metadata,
//! footage scanning, aggregate statistics, and the redacted public export
//! that gets committed to a stats repository.
//!
//! The GUI shell is a separate concern and is not part of this crate; every
//! operation here is callable from any presentation layer.

pub mod core;

pub use crate::core::{CoreError, CoreResult};
