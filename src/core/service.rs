//! Stat Service
//!
//! Single owner of the in-memory config document. All mutation funnels
//! through this service, which serializes access and allows at most one
//! long-running operation (scan, export+publish) in flight at a time —
//! the original app relied on "only one background thread" by convention;
//! here the permit makes it explicit.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::core::config::{ConfigDocument, ConfigStore, ProjectRecord};
use crate::core::export::{self, ExportDocument};
use crate::core::publish::Publisher;
use crate::core::scan::{FootageScanner, ScanReport};
use crate::core::stats::{self, StatsSnapshot};
use crate::core::{CoreError, CoreResult, ProjectId};

/// Orchestrates load, edits, scanning, statistics, and export/publish over
/// one config document.
pub struct StatService {
    store: ConfigStore,
    doc: Mutex<ConfigDocument>,
    scanner: FootageScanner,
    // Held for the duration of a scan or export+publish; try-acquired so a
    // second operation fails fast instead of queueing.
    in_flight: Mutex<()>,
}

impl StatService {
    /// Open the service over the given config path, loading the persisted
    /// document or falling back to defaults when the file is absent.
    pub fn open(config_path: PathBuf) -> CoreResult<Self> {
        let store = ConfigStore::new(config_path);
        let doc = store.load()?;
        Ok(Self {
            store,
            doc: Mutex::new(doc),
            scanner: FootageScanner::new(),
            in_flight: Mutex::new(()),
        })
    }

    /// Replace the footage scanner (e.g. to swap the duration strategy).
    pub fn with_scanner(mut self, scanner: FootageScanner) -> Self {
        self.scanner = scanner;
        self
    }

    /// A clone of the current in-memory document.
    pub async fn document(&self) -> ConfigDocument {
        self.doc.lock().await.clone()
    }

    /// Add a project and persist the document.
    ///
    /// A title colliding with an existing project key is rejected and
    /// nothing is written.
    pub async fn add_project(&self, record: ProjectRecord) -> CoreResult<ProjectId> {
        let mut doc = self.doc.lock().await;
        let id = doc.add_project(record)?;
        doc.touch();
        self.persist(&doc).await?;
        info!(project = %id, "Added project");
        Ok(id)
    }

    /// Compute a fresh statistics snapshot.
    pub async fn stats(&self) -> StatsSnapshot {
        let doc = self.doc.lock().await;
        stats::compute(&doc.projects)
    }

    /// Scan footage for every included project, update the document in
    /// place, and persist it.
    ///
    /// Per-project failures are reported in the returned [`ScanReport`];
    /// the batch itself never aborts. Fails fast with
    /// [`CoreError::OperationInFlight`] if a scan or export is running.
    pub async fn scan_footage(&self) -> CoreResult<ScanReport> {
        let _permit = self
            .in_flight
            .try_lock()
            .map_err(|_| CoreError::OperationInFlight)?;

        let mut doc = self.doc.lock().await;
        let report = self.scanner.scan_all(&mut doc);
        doc.touch();
        self.persist(&doc).await?;

        info!(
            scanned = report.scanned_count,
            total_hours = report.total_hours,
            failures = report.failures.len(),
            "Footage scan finished"
        );
        Ok(report)
    }

    /// Build the public export and write it to `path`.
    pub async fn export(&self, path: &Path) -> CoreResult<ExportDocument> {
        let _permit = self
            .in_flight
            .try_lock()
            .map_err(|_| CoreError::OperationInFlight)?;

        self.build_and_write(path).await
    }

    /// Build the public export, write it to `path`, then hand it to the
    /// publisher.
    ///
    /// A publish failure is reported to the caller; the export artifact
    /// stays on disk and is not rolled back or retried.
    pub async fn export_and_publish(
        &self,
        path: &Path,
        publisher: &dyn Publisher,
        message: &str,
    ) -> CoreResult<ExportDocument> {
        let _permit = self
            .in_flight
            .try_lock()
            .map_err(|_| CoreError::OperationInFlight)?;

        let export = self.build_and_write(path).await?;

        match publisher.publish(path, message).await {
            Ok(()) => {
                info!(path = %path.display(), "Export published");
                Ok(export)
            }
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "Publish failed; export artifact kept on disk"
                );
                Err(e)
            }
        }
    }

    async fn build_and_write(&self, path: &Path) -> CoreResult<ExportDocument> {
        let export = {
            let doc = self.doc.lock().await;
            export::build_export(&doc.projects, Utc::now())
        };

        let out = path.to_path_buf();
        let artifact = export.clone();
        tokio::task::spawn_blocking(move || export::write_export(&out, &artifact))
            .await
            .map_err(|e| CoreError::IoError(std::io::Error::other(e)))??;
        Ok(export)
    }

    /// Persist a snapshot of the document off the async runtime; the save
    /// takes a blocking file lock and must not stall a worker thread.
    async fn persist(&self, doc: &ConfigDocument) -> CoreResult<()> {
        let store = self.store.clone();
        let snapshot = doc.clone();
        tokio::task::spawn_blocking(move || store.save(&snapshot))
            .await
            .map_err(|e| CoreError::IoError(std::io::Error::other(e)))?
    }
}
