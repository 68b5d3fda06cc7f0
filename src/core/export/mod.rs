//! Public Export Builder
//!
//! Transforms the project mapping into the redacted document that gets
//! committed to the public stats repository: full (client-free) records
//! for dashboard-visible projects, an anonymized aggregate for NDA work.
//!
//! The grand totals mirror the statistics aggregator exactly: footage and
//! runtime honor `include_in_stats`, coffee counts every project. The
//! public/NDA partition goes by `visible_in_dashboard` alone. All of this
//! is intentional.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::config::{ProjectCategory, ProjectRecord, ProjectStatus, ProjectType};
use crate::core::{CoreResult, Hours, ProjectId};

// =============================================================================
// Export Document
// =============================================================================

/// Redacted public view of one visible project.
///
/// `client_name` is deliberately absent; it never leaves the config file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PublicProject {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ProjectType,
    pub status: ProjectStatus,
    pub category: ProjectCategory,
    pub footage_hours: Hours,
    pub final_runtime_minutes: u64,
    pub coffee_cups: u64,
    pub production_days: u64,
}

/// Anonymized rollup of every dashboard-hidden project.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NdaSummary {
    pub total_count: usize,
    pub total_footage_hours: Hours,
    pub total_coffee_cups: u64,
    pub total_released_minutes: u64,
}

/// The published `stats.json` shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub last_updated: String,
    pub total_footage_hours: Hours,
    pub total_released_minutes: u64,
    pub total_coffee_cups: u64,
    pub public_projects: Vec<PublicProject>,
    /// `null` in the output when no project is hidden
    pub nda_projects: Option<NdaSummary>,
}

// =============================================================================
// Builder
// =============================================================================

/// Build the public export document. Stateless; the input is not mutated.
pub fn build_export(
    projects: &BTreeMap<ProjectId, ProjectRecord>,
    now: DateTime<Utc>,
) -> ExportDocument {
    let mut public_projects = Vec::new();
    let mut nda = NdaSummary::default();

    let mut total_footage: Hours = 0.0;
    let mut total_released: u64 = 0;
    let mut total_coffee: u64 = 0;

    for record in projects.values() {
        // Grand totals follow the statistics aggregator's filters: footage
        // and runtime honor inclusion, coffee counts every project.
        if record.include_in_stats {
            total_footage += record.footage_hours;
            total_released += record.final_runtime_minutes;
        }
        total_coffee += record.coffee_cups;

        // The public/NDA partition goes by visibility alone.
        if record.visible_in_dashboard {
            public_projects.push(PublicProject {
                title: record.title.clone(),
                kind: record.kind,
                status: record.status,
                category: record.category,
                footage_hours: record.footage_hours,
                final_runtime_minutes: record.final_runtime_minutes,
                coffee_cups: record.coffee_cups,
                production_days: record.production_days,
            });
        } else {
            nda.total_count += 1;
            nda.total_footage_hours += record.footage_hours;
            nda.total_coffee_cups += record.coffee_cups;
            nda.total_released_minutes += record.final_runtime_minutes;
        }
    }

    ExportDocument {
        last_updated: now.to_rfc3339(),
        total_footage_hours: total_footage,
        total_released_minutes: total_released,
        total_coffee_cups: total_coffee,
        public_projects,
        nda_projects: (nda.total_count > 0).then_some(nda),
    }
}

/// Write the export artifact as human-formatted JSON, atomically.
///
/// The artifact is always written before any publish attempt, and it stays
/// on disk if the publish later fails.
pub fn write_export(path: &Path, doc: &ExportDocument) -> CoreResult<()> {
    crate::core::fs::atomic_write_json_pretty(path, doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ProjectRecord;
    use tempfile::TempDir;

    fn sample_projects() -> BTreeMap<ProjectId, ProjectRecord> {
        let mut projects = BTreeMap::new();

        let mut a = ProjectRecord::new("Open Doc");
        a.footage_hours = 2.0;
        a.final_runtime_minutes = 30;
        a.coffee_cups = 1;
        projects.insert("open_doc".to_string(), a);

        let mut b = ProjectRecord::new("Hush Hush");
        b.category = ProjectCategory::Commercial;
        b.client_name = "Secret Client".to_string();
        b.footage_hours = 5.0;
        b.coffee_cups = 2;
        b.include_in_stats = false;
        b.visible_in_dashboard = false;
        projects.insert("hush_hush".to_string(), b);

        projects
    }

    #[test]
    fn reference_scenario() {
        let export = build_export(&sample_projects(), Utc::now());

        assert_eq!(export.public_projects.len(), 1);
        assert_eq!(export.public_projects[0].title, "Open Doc");

        let nda = export.nda_projects.expect("one hidden project");
        assert_eq!(nda.total_count, 1);
        assert_eq!(nda.total_footage_hours, 5.0);
        assert_eq!(nda.total_coffee_cups, 2);
        assert_eq!(nda.total_released_minutes, 0);

        // Grand totals match the aggregator semantics.
        assert_eq!(export.total_footage_hours, 2.0);
        assert_eq!(export.total_released_minutes, 30);
        assert_eq!(export.total_coffee_cups, 3);
    }

    #[test]
    fn nda_rollup_ignores_inclusion_flag() {
        let mut projects = BTreeMap::new();
        for (i, include) in [(0u64, true), (1, false)] {
            let mut r = ProjectRecord::new(format!("Hidden {i}"));
            r.visible_in_dashboard = false;
            r.include_in_stats = include;
            r.footage_hours = 1.0;
            projects.insert(format!("hidden_{i}"), r);
        }

        let nda = build_export(&projects, Utc::now()).nda_projects.unwrap();
        assert_eq!(nda.total_count, 2);
        assert_eq!(nda.total_footage_hours, 2.0);
    }

    #[test]
    fn grand_total_coffee_counts_excluded_projects_too() {
        let mut projects = BTreeMap::new();
        let mut a = ProjectRecord::new("Counted");
        a.coffee_cups = 1;
        projects.insert("counted".to_string(), a);

        let mut b = ProjectRecord::new("Uncounted");
        b.coffee_cups = 3;
        b.include_in_stats = false;
        projects.insert("uncounted".to_string(), b);

        let export = build_export(&projects, Utc::now());
        assert_eq!(export.total_coffee_cups, 4);
        // Footage and runtime still honor the inclusion flag.
        assert_eq!(export.total_footage_hours, 0.0);
        assert_eq!(export.total_released_minutes, 0);
    }

    #[test]
    fn client_name_never_appears_in_output() {
        let mut projects = sample_projects();
        // Even a visible commercial project must not leak its client.
        let mut c = ProjectRecord::new("Branded Spot");
        c.category = ProjectCategory::Commercial;
        c.client_name = "Acme".to_string();
        projects.insert("branded_spot".to_string(), c);

        let export = build_export(&projects, Utc::now());
        let json = serde_json::to_string_pretty(&export).unwrap();
        assert!(!json.contains("client_name"));
        assert!(!json.contains("Acme"));
        assert!(!json.contains("Secret Client"));
    }

    #[test]
    fn nda_projects_serializes_as_null_when_all_visible() {
        let mut projects = BTreeMap::new();
        projects.insert("a".to_string(), ProjectRecord::new("Visible"));

        let export = build_export(&projects, Utc::now());
        assert!(export.nda_projects.is_none());

        let json = serde_json::to_value(&export).unwrap();
        assert!(json["nda_projects"].is_null());
    }

    #[test]
    fn write_export_produces_readable_artifact() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stats.json");

        let export = build_export(&sample_projects(), Utc::now());
        write_export(&path, &export).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: ExportDocument = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed, export);
        // Human-formatted output.
        assert!(content.contains('\n'));
    }

    #[test]
    fn last_updated_uses_the_supplied_timestamp() {
        let now = Utc::now();
        let export = build_export(&BTreeMap::new(), now);
        assert_eq!(export.last_updated, now.to_rfc3339());
    }
}
