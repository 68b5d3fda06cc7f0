//! VideoStat Error Definitions
//!
//! Defines error types used throughout the core.

use std::path::PathBuf;

use thiserror::Error;

use super::ProjectId;

/// Core error types
#[derive(Error, Debug)]
pub enum CoreError {
    // =========================================================================
    // Config Errors
    // =========================================================================
    #[error("Config file corrupted: {0}")]
    ConfigCorrupted(String),

    // =========================================================================
    // Project Errors
    // =========================================================================
    #[error("Project already exists: {0}")]
    DuplicateProject(ProjectId),

    #[error("Invalid project title: {0:?}")]
    InvalidTitle(String),

    // =========================================================================
    // Scan Errors
    // =========================================================================
    #[error("Failed to scan folder {}: {detail}", .path.display())]
    ScanFailed { path: PathBuf, detail: String },

    // =========================================================================
    // Publish Errors
    // =========================================================================
    #[error("Publish step '{step}' failed: {detail}")]
    PublishFailed { step: String, detail: String },

    // =========================================================================
    // Service Errors
    // =========================================================================
    #[error("Another scan or export is already in flight")]
    OperationInFlight,

    // =========================================================================
    // General Errors
    // =========================================================================
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Core result type
pub type CoreResult<T> = Result<T, CoreError>;
