//! Read-only totals and status histograms

use std::collections::BTreeMap;
use std::fmt;

use rusqlite::Connection;
use serde::Serialize;

use super::sqlite::SqliteStore;
use crate::Result;
use crate::model::EntityKind;

/// Row count per table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EntityCounts {
    pub projects: u64,
    pub shots: u64,
    pub assets: u64,
    pub tasks: u64,
    pub approvals: u64,
    pub schedules: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub counts: EntityCounts,
    /// Assets per status, sorted by status name
    pub asset_status: BTreeMap<String, u64>,
    /// Tasks per status, sorted by status name
    pub task_status: BTreeMap<String, u64>,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = &self.counts;
        write!(
            f,
            "Totals: {} projects, {} shots, {} assets, {} tasks, {} approvals, {} schedules",
            c.projects, c.shots, c.assets, c.tasks, c.approvals, c.schedules
        )
    }
}

impl SqliteStore {
    pub fn summary(&self) -> Result<Summary> {
        let conn = self.connect()?;

        let counts = EntityCounts {
            projects: count_rows(&conn, EntityKind::Project)?,
            shots: count_rows(&conn, EntityKind::Shot)?,
            assets: count_rows(&conn, EntityKind::Asset)?,
            tasks: count_rows(&conn, EntityKind::Task)?,
            approvals: count_rows(&conn, EntityKind::Approval)?,
            schedules: count_rows(&conn, EntityKind::Schedule)?,
        };

        Ok(Summary {
            counts,
            asset_status: status_histogram(&conn, EntityKind::Asset)?,
            task_status: status_histogram(&conn, EntityKind::Task)?,
        })
    }
}

fn count_rows(conn: &Connection, kind: EntityKind) -> Result<u64> {
    let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {}", kind.table()), [], |row| {
        row.get(0)
    })?;
    Ok(count as u64)
}

fn status_histogram(conn: &Connection, kind: EntityKind) -> Result<BTreeMap<String, u64>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT status, COUNT(*) FROM {} GROUP BY status",
        kind.table()
    ))?;
    let rows = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows.into_iter().map(|(status, n)| (status, n as u64)).collect())
}

#[cfg(test)]
mod tests {
    use crate::model::{NewApproval, NewAsset, NewProject, NewSchedule, NewShot, NewTask};
    use crate::storage::sqlite::test_support::temp_store;
    use crate::storage::{AssetFilter, PurgeScope};

    #[test]
    fn test_empty_database_summary() {
        let (_dir, store) = temp_store();
        let summary = store.summary().unwrap();
        assert_eq!(summary.counts.projects, 0);
        assert!(summary.asset_status.is_empty());
        assert_eq!(
            summary.to_string(),
            "Totals: 0 projects, 0 shots, 0 assets, 0 tasks, 0 approvals, 0 schedules"
        );
    }

    #[test]
    fn test_counts_match_listings() {
        let (_dir, store) = temp_store();
        store.create_asset(&NewAsset::new("Hero", "character")).unwrap();
        store.create_asset(&NewAsset::new("Car", "prop").with_status("done")).unwrap();
        store.create_asset(&NewAsset::new("Sky", "env").with_status("done")).unwrap();

        let summary = store.summary().unwrap();
        assert_eq!(
            summary.counts.assets as usize,
            store.list_assets(AssetFilter::default()).unwrap().len()
        );
        let statuses: Vec<(&str, u64)> = summary
            .asset_status
            .iter()
            .map(|(s, n)| (s.as_str(), *n))
            .collect();
        assert_eq!(statuses, vec![("done", 2), ("todo", 1)]);
    }

    #[test]
    fn test_scenario_counts_then_purge() {
        let (_dir, store) = temp_store();
        let film = store.require_project(store.create_project(&NewProject::new("Film", "FILM")).unwrap()).unwrap();
        let s010 = store.require_shot(store.create_shot(&NewShot::new(film, "S010", "Opening")).unwrap()).unwrap();
        let hero = store
            .require_asset(store.create_asset(&NewAsset::new("Hero", "character").in_project(film).in_shot(s010)).unwrap())
            .unwrap();
        store.create_task(&NewTask::new(hero, "Model")).unwrap();
        store.create_approval(&NewApproval::new(hero, "approved")).unwrap();
        store.create_schedule(&NewSchedule::new(hero, "Model", "2025-01-10")).unwrap();

        let summary = store.summary().unwrap();
        assert_eq!(
            summary.to_string(),
            "Totals: 1 projects, 1 shots, 1 assets, 1 tasks, 1 approvals, 1 schedules"
        );
        assert_eq!(summary.task_status.get("todo"), Some(&1));

        let report = store.purge(PurgeScope::All).unwrap();
        assert_eq!(report.to_string(), "Deleted 1 project(s)");
        assert_eq!(store.summary().unwrap().counts, Default::default());
    }
}
