//! Statistics Aggregator
//!
//! Derives a fresh [`StatsSnapshot`] from the project mapping on every
//! call. Pure: no side effects, no mutation of the input.
//!
//! Two filters apply and they are deliberately different:
//! - footage/runtime sums honor `include_in_stats`,
//! - coffee is counted across every project regardless of inclusion.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::config::{ProjectRecord, ProjectStatus};
use crate::core::{Hours, ProjectId};

/// Aggregate counters over the project mapping.
///
/// Derived on demand; never persisted by this module.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Count of all projects
    pub total_projects: usize,
    /// `status == active` and counted in stats
    pub active_projects: usize,
    /// Shown on the public dashboard
    pub visible_projects: usize,
    /// Hidden from the dashboard (NDA work)
    pub nda_projects: usize,
    /// Footage hours over projects counted in stats
    pub total_footage_hours: Hours,
    /// Released minutes over projects counted in stats
    pub total_released_minutes: u64,
    /// Coffee over ALL projects, included in stats or not
    pub total_coffee_cups: u64,
}

/// Compute a snapshot of the given projects.
pub fn compute(projects: &BTreeMap<ProjectId, ProjectRecord>) -> StatsSnapshot {
    let mut snapshot = StatsSnapshot {
        total_projects: projects.len(),
        ..StatsSnapshot::default()
    };

    for record in projects.values() {
        if record.status == ProjectStatus::Active && record.include_in_stats {
            snapshot.active_projects += 1;
        }
        if record.visible_in_dashboard {
            snapshot.visible_projects += 1;
        }
        if record.include_in_stats {
            snapshot.total_footage_hours += record.footage_hours;
            snapshot.total_released_minutes += record.final_runtime_minutes;
        }
        snapshot.total_coffee_cups += record.coffee_cups;
    }

    snapshot.nda_projects = snapshot.total_projects - snapshot.visible_projects;
    snapshot
}
