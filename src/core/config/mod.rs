//! Config Store
//!
//! The persisted project registry: every shooting project the producer
//! tracks, plus the recognized video formats and the last-updated stamp.
//!
//! Persistence properties:
//! - Atomic file writes (temp file + rename, via `core::fs`)
//! - Advisory lock file so concurrent processes never interleave a read
//!   with a half-finished write
//! - Absent file falls back to defaults; malformed content is fatal and is
//!   never guess-repaired

use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::{CoreError, CoreResult, Hours, ProjectId};

/// Lock file suffix (advisory lock to prevent concurrent writers)
const LOCK_SUFFIX: &str = "lock";

/// Video formats recognized out of the box.
///
/// Entries carry a leading dot as in the original config files; matching
/// tolerates either form.
pub const DEFAULT_VIDEO_FORMATS: &[&str] = &[".mp4", ".braw", ".mov", ".avi", ".mkv"];

// =============================================================================
// Project Record
// =============================================================================

/// Project type
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectType {
    #[default]
    Documentary,
    Interview,
    Reportage,
}

/// Project lifecycle status
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    #[default]
    Active,
    Completed,
    Archive,
    Planning,
}

/// Personal vs. client work
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectCategory {
    #[default]
    Personal,
    Commercial,
}

/// One shooting project.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    /// Display title; the project key is derived from it
    pub title: String,

    #[serde(rename = "type", default)]
    pub kind: ProjectType,

    #[serde(default)]
    pub status: ProjectStatus,

    #[serde(default)]
    pub category: ProjectCategory,

    /// Present only for commercial projects; never exported
    #[serde(default)]
    pub client_name: String,

    /// Folders scanned for footage, in order
    #[serde(default)]
    pub folder_mapping: Vec<PathBuf>,

    /// Written by the footage scanner only
    #[serde(default)]
    pub footage_hours: Hours,

    /// Released runtime, user-entered
    #[serde(default)]
    pub final_runtime_minutes: u64,

    #[serde(default)]
    pub coffee_cups: u64,

    /// User-supplied; never computed
    #[serde(default)]
    pub production_days: u64,

    #[serde(default = "default_true")]
    pub visible_in_dashboard: bool,

    #[serde(default = "default_true")]
    pub include_in_stats: bool,
}

fn default_true() -> bool {
    true
}

impl ProjectRecord {
    /// Create a record with the given title and field defaults.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            kind: ProjectType::default(),
            status: ProjectStatus::default(),
            category: ProjectCategory::default(),
            client_name: String::new(),
            folder_mapping: Vec::new(),
            footage_hours: 0.0,
            final_runtime_minutes: 0,
            coffee_cups: 0,
            production_days: 0,
            visible_in_dashboard: true,
            include_in_stats: true,
        }
    }

    /// Enforce record invariants in place.
    ///
    /// `client_name` is only meaningful for commercial projects, and
    /// `footage_hours` must stay a non-negative finite number.
    pub fn normalize(&mut self) {
        if self.category != ProjectCategory::Commercial {
            self.client_name.clear();
        }
        if !self.footage_hours.is_finite() || self.footage_hours < 0.0 {
            self.footage_hours = 0.0;
        }
    }
}

// =============================================================================
// Config Document
// =============================================================================

/// Derive a project key from its title: lower-cased, spaces to underscores.
pub fn project_id_from_title(title: &str) -> CoreResult<ProjectId> {
    if title.trim().is_empty() {
        return Err(CoreError::InvalidTitle(title.to_string()));
    }
    Ok(title.to_lowercase().replace(' ', "_"))
}

/// Case-insensitive extension membership test against a format list.
///
/// Format entries may be written with or without a leading dot.
pub fn matches_extension(path: &Path, formats: &[String]) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    let ext = ext.to_lowercase();
    formats
        .iter()
        .any(|fmt| fmt.trim_start_matches('.').to_lowercase() == ext)
}

/// The persisted root document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConfigDocument {
    /// All projects, keyed by normalized title
    pub projects: BTreeMap<ProjectId, ProjectRecord>,

    /// Recognized video file extensions
    pub video_formats: Vec<String>,

    /// Timestamp of the last successful scan/save (ISO 8601)
    pub last_updated: String,
}

impl Default for ConfigDocument {
    fn default() -> Self {
        Self {
            projects: BTreeMap::new(),
            video_formats: DEFAULT_VIDEO_FORMATS.iter().map(|s| s.to_string()).collect(),
            last_updated: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl ConfigDocument {
    /// Add a project under its title-derived key.
    ///
    /// Two titles that normalize to the same key are a conflict: the add is
    /// rejected and the existing project is left untouched. Callers decide
    /// whether to rename or abandon.
    pub fn add_project(&mut self, record: ProjectRecord) -> CoreResult<ProjectId> {
        let id = project_id_from_title(&record.title)?;
        if self.projects.contains_key(&id) {
            return Err(CoreError::DuplicateProject(id));
        }
        let mut record = record;
        record.normalize();
        self.projects.insert(id.clone(), record);
        Ok(id)
    }

    /// Whether a file path has a recognized video extension.
    pub fn is_video_format(&self, path: &Path) -> bool {
        matches_extension(path, &self.video_formats)
    }

    /// Stamp `last_updated` with the current time.
    pub fn touch(&mut self) {
        self.last_updated = chrono::Utc::now().to_rfc3339();
    }
}

// =============================================================================
// Config Store
// =============================================================================

/// Loads and saves the config document at a fixed path.
///
/// Cheap to clone; clones share the path and coordinate through the
/// on-disk lock file.
#[derive(Clone)]
pub struct ConfigStore {
    config_path: PathBuf,
}

impl ConfigStore {
    pub fn new(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    /// The config file path
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    fn lock_path(&self) -> PathBuf {
        let file_name = self
            .config_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "config.json".to_string());
        self.config_path
            .with_file_name(format!("{file_name}.{LOCK_SUFFIX}"))
    }

    fn with_lock<T>(&self, exclusive: bool, op: impl FnOnce() -> CoreResult<T>) -> CoreResult<T> {
        // The parent directory must exist before the lock file can be created.
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let lock_file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(self.lock_path())?;

        if exclusive {
            fs2::FileExt::lock_exclusive(&lock_file)?;
        } else {
            fs2::FileExt::lock_shared(&lock_file)?;
        }

        let result = op();

        if let Err(e) = fs2::FileExt::unlock(&lock_file) {
            warn!("Failed to unlock config lock file: {}", e);
        }

        result
    }

    /// Load the config document.
    ///
    /// An absent file is not an error and yields the default document. A
    /// malformed file is fatal: the caller gets `ConfigCorrupted` rather
    /// than defaults that would silently overwrite the operator's data on
    /// the next save.
    pub fn load(&self) -> CoreResult<ConfigDocument> {
        self.with_lock(false, || {
            if !self.config_path.exists() {
                info!("Config file not found, using defaults");
                return Ok(ConfigDocument::default());
            }

            let content = std::fs::read_to_string(&self.config_path)?;
            let doc = serde_json::from_str::<ConfigDocument>(&content)
                .map_err(|e| CoreError::ConfigCorrupted(e.to_string()))?;
            Ok(doc)
        })
    }

    /// Save the config document atomically.
    ///
    /// Records are normalized on the way out so invariants hold in the
    /// persisted file regardless of how the in-memory copy was mutated.
    pub fn save(&self, doc: &ConfigDocument) -> CoreResult<()> {
        self.with_lock(true, || {
            let mut normalized = doc.clone();
            for record in normalized.projects.values_mut() {
                record.normalize();
            }

            crate::core::fs::atomic_write_json_pretty(&self.config_path, &normalized)?;
            info!("Config saved to {:?}", self.config_path);
            Ok(())
        })
    }
}
