//! Footage Scanner
//!
//! Walks each project's mapped folders and turns matched video files into
//! an approximate footage-hours figure.
//!
//! The shipped estimator is a deliberate placeholder keyed on file size,
//! not a media probe; it sits behind [`DurationEstimator`] so a real
//! container-duration inspection can be swapped in without touching
//! callers.

use std::path::Path;

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::core::config::{matches_extension, ConfigDocument, ProjectRecord};
use crate::core::{round_hours, CoreError, CoreResult, Hours, ProjectId};

// =============================================================================
// Estimation Strategy
// =============================================================================

/// Duration estimation strategy for one matched file.
pub trait DurationEstimator: Send + Sync {
    /// Estimated duration in hours for a file of `size_bytes`.
    ///
    /// Must be non-negative and monotonically related to file size for
    /// size-based strategies.
    fn estimate(&self, path: &Path, size_bytes: u64) -> Hours;
}

/// Placeholder heuristic: 100 MiB of footage counts as one hour.
pub struct FileSizeEstimator;

impl DurationEstimator for FileSizeEstimator {
    fn estimate(&self, _path: &Path, size_bytes: u64) -> Hours {
        size_bytes as f64 / (1024.0 * 1024.0 * 100.0)
    }
}

// =============================================================================
// Scan Report
// =============================================================================

/// A project whose scan failed; the batch continues without it.
#[derive(Debug)]
pub struct ScanFailure {
    pub project_id: ProjectId,
    pub error: CoreError,
}

/// Result of scanning every included project.
#[derive(Debug, Default)]
pub struct ScanReport {
    /// Sum of footage hours across successfully scanned projects
    pub total_hours: Hours,
    /// Number of projects scanned successfully
    pub scanned_count: usize,
    /// Per-project failures
    pub failures: Vec<ScanFailure>,
}

// =============================================================================
// Scanner
// =============================================================================

/// Recursive folder scanner producing footage-hour estimates.
pub struct FootageScanner {
    estimator: Box<dyn DurationEstimator>,
}

impl Default for FootageScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl FootageScanner {
    /// Scanner with the default file-size heuristic.
    pub fn new() -> Self {
        Self {
            estimator: Box::new(FileSizeEstimator),
        }
    }

    /// Scanner with a custom estimation strategy.
    pub fn with_estimator(estimator: Box<dyn DurationEstimator>) -> Self {
        Self { estimator }
    }

    /// Estimate footage hours for one project.
    ///
    /// Nonexistent mapped folders are skipped silently. Unreadable entries
    /// below an existing root are skipped with a debug log; a root that
    /// exists but cannot be read at all fails the project.
    pub fn scan(&self, record: &ProjectRecord, formats: &[String]) -> CoreResult<Hours> {
        let mut total: Hours = 0.0;

        for folder in &record.folder_mapping {
            if !folder.exists() {
                debug!(path = %folder.display(), "Scan path does not exist, skipping");
                continue;
            }

            for entry in WalkDir::new(folder).follow_links(false) {
                let entry = match entry {
                    Ok(e) => e,
                    Err(e) => {
                        // An error on the root itself means the whole
                        // folder is unreadable; anything deeper is skipped.
                        if e.depth() == 0 || e.path() == Some(folder.as_path()) {
                            return Err(CoreError::ScanFailed {
                                path: folder.clone(),
                                detail: e.to_string(),
                            });
                        }
                        debug!(error = %e, "Skipping unreadable entry during scan");
                        continue;
                    }
                };

                if !entry.file_type().is_file() {
                    continue;
                }
                if !matches_extension(entry.path(), formats) {
                    continue;
                }

                let size = match entry.metadata() {
                    Ok(meta) => meta.len(),
                    Err(e) => {
                        debug!(error = %e, path = %entry.path().display(), "Skipping unreadable file");
                        continue;
                    }
                };

                total += self.estimator.estimate(entry.path(), size);
            }
        }

        Ok(round_hours(total))
    }

    /// Scan every project with `include_in_stats == true`, updating each
    /// project's `footage_hours` in place.
    ///
    /// Excluded projects are never touched. A failing project lands in the
    /// report and the remaining projects are still scanned.
    pub fn scan_all(&self, doc: &mut ConfigDocument) -> ScanReport {
        let formats = doc.video_formats.clone();
        let mut report = ScanReport::default();

        for (id, record) in doc.projects.iter_mut() {
            if !record.include_in_stats {
                continue;
            }

            match self.scan(record, &formats) {
                Ok(hours) => {
                    record.footage_hours = hours;
                    report.total_hours += hours;
                    report.scanned_count += 1;
                    info!(project = %id, hours, "Scanned project footage");
                }
                Err(e) => {
                    warn!(project = %id, error = %e, "Project scan failed, continuing");
                    report.failures.push(ScanFailure {
                        project_id: id.clone(),
                        error: e,
                    });
                }
            }
        }

        report.total_hours = round_hours(report.total_hours);
        report
    }
}
