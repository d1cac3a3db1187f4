//! Asset repository

use rusqlite::types::Value;
use rusqlite::{OptionalExtension, params, params_from_iter};

use super::sqlite::{Changes, SqliteStore, now_timestamp};
use crate::Result;
use crate::model::{Asset, AssetUpdate, EntityKind, NewAsset, ProjectRef, ShotRef};

const ASSET_COLUMNS: &str = "id, name, asset_type, status, created_at, project_id, shot_id";

/// Optional narrowing for `list_assets`; both filters combine with AND.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssetFilter {
    pub project_id: Option<i64>,
    pub shot_id: Option<i64>,
}

impl AssetFilter {
    pub fn project(project_id: i64) -> Self {
        Self {
            project_id: Some(project_id),
            shot_id: None,
        }
    }

    pub fn shot(shot_id: i64) -> Self {
        Self {
            project_id: None,
            shot_id: Some(shot_id),
        }
    }
}

impl SqliteStore {
    pub fn create_asset(&self, asset: &NewAsset) -> Result<i64> {
        let conn = self.connect()?;
        conn.execute(
            r#"
            INSERT INTO assets (name, asset_type, status, created_at, project_id, shot_id)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                asset.name,
                asset.asset_type,
                asset.status,
                now_timestamp(),
                asset.project.map(ProjectRef::id),
                asset.shot.map(ShotRef::id),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Assets matching `filter`, ordered by id
    pub fn list_assets(&self, filter: AssetFilter) -> Result<Vec<Asset>> {
        let mut sql = format!("SELECT {ASSET_COLUMNS} FROM assets");
        let mut conditions: Vec<String> = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        if let Some(project_id) = filter.project_id {
            values.push(Value::Integer(project_id));
            conditions.push(format!("project_id = ?{}", values.len()));
        }
        if let Some(shot_id) = filter.shot_id {
            values.push(Value::Integer(shot_id));
            conditions.push(format!("shot_id = ?{}", values.len()));
        }
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(" ORDER BY id");

        let conn = self.connect()?;
        let mut stmt = conn.prepare(&sql)?;
        let assets = stmt
            .query_map(params_from_iter(values), row_to_asset)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(assets)
    }

    pub fn get_asset(&self, id: i64) -> Result<Option<Asset>> {
        let conn = self.connect()?;
        conn.query_row(
            &format!("SELECT {ASSET_COLUMNS} FROM assets WHERE id = ?1"),
            [id],
            row_to_asset,
        )
        .optional()
        .map_err(Into::into)
    }

    pub fn update_asset(&self, id: i64, update: AssetUpdate) -> Result<bool> {
        let mut changes = Changes::default();
        changes.text("name", update.name);
        changes.text("asset_type", update.asset_type);
        changes.text("status", update.status);
        changes.id("project_id", update.project.map(ProjectRef::id));
        changes.id("shot_id", update.shot.map(ShotRef::id));
        self.update_row(EntityKind::Asset, id, changes)
    }

    /// Delete the asset row only. Its tasks, approvals and schedules stay.
    pub fn delete_asset(&self, id: i64) -> Result<bool> {
        self.delete_row(EntityKind::Asset, id)
    }
}

fn row_to_asset(row: &rusqlite::Row) -> rusqlite::Result<Asset> {
    Ok(Asset {
        id: row.get(0)?,
        name: row.get(1)?,
        asset_type: row.get(2)?,
        status: row.get(3)?,
        created_at: row.get(4)?,
        project_id: row.get(5)?,
        shot_id: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::AssetFilter;
    use crate::model::{AssetUpdate, NewApproval, NewAsset, NewProject, NewSchedule, NewShot, NewTask};
    use crate::storage::sqlite::test_support::temp_store;

    #[test]
    fn test_asset_filters() {
        let (_dir, store) = temp_store();
        let film = store.require_project(store.create_project(&NewProject::new("Film", "FILM")).unwrap()).unwrap();
        let s010 = store.require_shot(store.create_shot(&NewShot::new(film, "S010", "Opening")).unwrap()).unwrap();
        let s020 = store.require_shot(store.create_shot(&NewShot::new(film, "S020", "Chase")).unwrap()).unwrap();

        store.create_asset(&NewAsset::new("Loose", "prop")).unwrap();
        store.create_asset(&NewAsset::new("Hero", "character").in_project(film).in_shot(s010)).unwrap();
        store.create_asset(&NewAsset::new("Car", "prop").in_project(film).in_shot(s020)).unwrap();
        store.create_asset(&NewAsset::new("Sky", "env").in_project(film)).unwrap();

        assert_eq!(store.list_assets(AssetFilter::default()).unwrap().len(), 4);
        assert_eq!(store.list_assets(AssetFilter::project(film.id())).unwrap().len(), 3);

        let in_s010 = store.list_assets(AssetFilter::shot(s010.id())).unwrap();
        assert_eq!(in_s010.len(), 1);
        assert_eq!(in_s010[0].name, "Hero");

        let both = AssetFilter {
            project_id: Some(film.id()),
            shot_id: Some(s020.id()),
        };
        let names: Vec<String> = store.list_assets(both).unwrap().into_iter().map(|a| a.name).collect();
        assert_eq!(names, vec!["Car"]);
    }

    #[test]
    fn test_asset_without_parents() {
        let (_dir, store) = temp_store();
        let id = store.create_asset(&NewAsset::new("Rock", "prop")).unwrap();
        let asset = store.get_asset(id).unwrap().unwrap();
        assert_eq!(asset.status, "todo");
        assert!(asset.project_id.is_none());
        assert!(asset.shot_id.is_none());
    }

    #[test]
    fn test_update_status_only() {
        let (_dir, store) = temp_store();
        let id = store.create_asset(&NewAsset::new("Hero", "character")).unwrap();
        let before = store.get_asset(id).unwrap().unwrap();

        let update = AssetUpdate {
            status: Some("done".to_string()),
            ..Default::default()
        };
        assert!(store.update_asset(id, update).unwrap());

        let after = store.get_asset(id).unwrap().unwrap();
        assert_eq!(after.status, "done");
        assert_eq!(after.name, before.name);
        assert_eq!(after.asset_type, before.asset_type);
        assert_eq!(after.created_at, before.created_at);
    }

    #[test]
    fn test_delete_asset_leaves_dependents() {
        let (_dir, store) = temp_store();
        let asset_id = store.create_asset(&NewAsset::new("Hero", "character")).unwrap();
        let asset = store.require_asset(asset_id).unwrap();
        let task = store.create_task(&NewTask::new(asset, "Model")).unwrap();
        let approval = store.create_approval(&NewApproval::new(asset, "approved")).unwrap();
        let schedule = store.create_schedule(&NewSchedule::new(asset, "Model", "2025-01-10")).unwrap();

        assert!(store.delete_asset(asset_id).unwrap());
        assert!(!store.asset_exists(asset_id).unwrap());

        // Narrow delete does not cascade.
        assert!(store.task_exists(task).unwrap());
        assert!(store.approval_exists(approval).unwrap());
        assert!(store.schedule_exists(schedule).unwrap());
    }
}
