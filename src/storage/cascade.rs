//! Cascading project purge
//!
//! The engine runs with foreign keys off, so nothing cascades on its own.
//! A purge walks the hierarchy by hand, children before parents, inside one
//! transaction.

use std::fmt;

use rusqlite::Transaction;
use serde::Serialize;
use tracing::{debug, info};

use super::sqlite::SqliteStore;
use crate::Result;

/// Which projects a purge removes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurgeScope {
    Project(i64),
    All,
}

/// Rows removed by a purge, per table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PurgeReport {
    pub projects: usize,
    pub shots: usize,
    pub assets: usize,
    pub tasks: usize,
    pub approvals: usize,
    pub schedules: usize,
}

impl PurgeReport {
    fn absorb(&mut self, other: PurgeReport) {
        self.projects += other.projects;
        self.shots += other.shots;
        self.assets += other.assets;
        self.tasks += other.tasks;
        self.approvals += other.approvals;
        self.schedules += other.schedules;
    }
}

impl fmt::Display for PurgeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Deleted {} project(s)", self.projects)
    }
}

// Assets reachable from project ?1, directly or through one of its shots.
const PROJECT_ASSETS: &str = "SELECT id FROM assets \
     WHERE project_id = ?1 OR shot_id IN (SELECT id FROM shots WHERE project_id = ?1)";

impl SqliteStore {
    /// Delete the targeted projects with all their shots, assets and
    /// asset-owned rows. Either everything goes or nothing does.
    pub fn purge(&self, scope: PurgeScope) -> Result<PurgeReport> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;

        let project_ids: Vec<i64> = match scope {
            PurgeScope::Project(id) => vec![id],
            PurgeScope::All => {
                let mut stmt = tx.prepare("SELECT id FROM projects ORDER BY id")?;
                stmt.query_map([], |row| row.get(0))?
                    .collect::<rusqlite::Result<Vec<_>>>()?
            }
        };

        let mut report = PurgeReport::default();
        for project_id in project_ids {
            let removed = purge_project(&tx, project_id)?;
            debug!(project_id, ?removed, "Purged project");
            report.absorb(removed);
        }
        tx.commit()?;

        info!(
            projects = report.projects,
            shots = report.shots,
            assets = report.assets,
            "Purge complete"
        );
        Ok(report)
    }
}

fn purge_project(tx: &Transaction<'_>, project_id: i64) -> Result<PurgeReport> {
    let schedules = tx.execute(
        &format!("DELETE FROM schedules WHERE asset_id IN ({PROJECT_ASSETS})"),
        [project_id],
    )?;
    let approvals = tx.execute(
        &format!("DELETE FROM approvals WHERE asset_id IN ({PROJECT_ASSETS})"),
        [project_id],
    )?;
    let tasks = tx.execute(
        &format!("DELETE FROM tasks WHERE asset_id IN ({PROJECT_ASSETS})"),
        [project_id],
    )?;
    let assets = tx.execute(
        "DELETE FROM assets \
         WHERE project_id = ?1 OR shot_id IN (SELECT id FROM shots WHERE project_id = ?1)",
        [project_id],
    )?;
    let shots = tx.execute("DELETE FROM shots WHERE project_id = ?1", [project_id])?;
    let projects = tx.execute("DELETE FROM projects WHERE id = ?1", [project_id])?;

    Ok(PurgeReport {
        projects,
        shots,
        assets,
        tasks,
        approvals,
        schedules,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewApproval, NewAsset, NewProject, NewSchedule, NewShot, NewTask};
    use crate::storage::AssetFilter;
    use crate::storage::sqlite::test_support::temp_store;

    /// One project with a shot, an asset under the shot, an asset directly
    /// under the project, and one task/approval/schedule per asset.
    fn seed_project(store: &SqliteStore, name: &str, code: &str) -> i64 {
        let project_id = store.create_project(&NewProject::new(name, code)).unwrap();
        let project = store.require_project(project_id).unwrap();
        let shot = store
            .require_shot(store.create_shot(&NewShot::new(project, "S010", "Opening")).unwrap())
            .unwrap();

        let via_shot = store
            .require_asset(store.create_asset(&NewAsset::new("Hero", "character").in_shot(shot)).unwrap())
            .unwrap();
        let direct = store
            .require_asset(store.create_asset(&NewAsset::new("Sky", "env").in_project(project)).unwrap())
            .unwrap();

        for asset in [via_shot, direct] {
            store.create_task(&NewTask::new(asset, "Model")).unwrap();
            store.create_approval(&NewApproval::new(asset, "approved")).unwrap();
            store.create_schedule(&NewSchedule::new(asset, "Model", "2025-01-10")).unwrap();
        }
        project_id
    }

    #[test]
    fn test_purge_removes_everything_reachable() {
        let (_dir, store) = temp_store();
        let film = seed_project(&store, "Film", "FILM");
        let promo = seed_project(&store, "Promo", "PRM");

        let report = store.purge(PurgeScope::Project(film)).unwrap();
        assert_eq!(
            report,
            PurgeReport {
                projects: 1,
                shots: 1,
                assets: 2,
                tasks: 2,
                approvals: 2,
                schedules: 2,
            }
        );
        assert_eq!(report.to_string(), "Deleted 1 project(s)");

        assert!(!store.project_exists(film).unwrap());
        assert!(store.list_shots(Some(film)).unwrap().is_empty());

        // Only the other project's rows survive.
        assert!(store.project_exists(promo).unwrap());
        let remaining = store.list_assets(AssetFilter::default()).unwrap();
        assert_eq!(remaining.len(), 2);
        let remaining_ids: Vec<i64> = remaining.iter().map(|a| a.id).collect();
        for task in store.list_tasks(None).unwrap() {
            assert!(remaining_ids.contains(&task.asset_id));
        }
        for approval in store.list_approvals(None).unwrap() {
            assert!(remaining_ids.contains(&approval.asset_id));
        }
        for schedule in store.list_schedules(None).unwrap() {
            assert!(remaining_ids.contains(&schedule.asset_id));
        }
        assert_eq!(store.list_shots(Some(promo)).unwrap().len(), 1);
    }

    #[test]
    fn test_purge_all() {
        let (_dir, store) = temp_store();
        seed_project(&store, "Film", "FILM");
        seed_project(&store, "Promo", "PRM");

        let report = store.purge(PurgeScope::All).unwrap();
        assert_eq!(report.projects, 2);
        assert_eq!(report.schedules, 4);
        assert!(store.list_projects().unwrap().is_empty());
        assert!(store.list_assets(AssetFilter::default()).unwrap().is_empty());
        assert!(store.list_tasks(None).unwrap().is_empty());
    }

    #[test]
    fn test_purge_unknown_project_is_noop() {
        let (_dir, store) = temp_store();
        seed_project(&store, "Film", "FILM");

        let report = store.purge(PurgeScope::Project(999)).unwrap();
        assert_eq!(report, PurgeReport::default());
        assert_eq!(report.to_string(), "Deleted 0 project(s)");
        assert_eq!(store.list_assets(AssetFilter::default()).unwrap().len(), 2);
    }

    #[test]
    fn test_purge_leaves_unparented_assets() {
        let (_dir, store) = temp_store();
        seed_project(&store, "Film", "FILM");
        let loose = store.create_asset(&NewAsset::new("Rock", "prop")).unwrap();

        store.purge(PurgeScope::All).unwrap();
        assert!(store.asset_exists(loose).unwrap());
    }
}
