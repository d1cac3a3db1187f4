//! Task repository

use rusqlite::{OptionalExtension, params};

use super::sqlite::{Changes, SqliteStore, now_timestamp};
use crate::Result;
use crate::model::{AssetRef, EntityKind, NewTask, Task, TaskUpdate};

const TASK_COLUMNS: &str = "id, asset_id, name, status, assignee, due_date, created_at";

impl SqliteStore {
    pub fn create_task(&self, task: &NewTask) -> Result<i64> {
        let conn = self.connect()?;
        conn.execute(
            r#"
            INSERT INTO tasks (asset_id, name, status, assignee, due_date, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                task.asset.id(),
                task.name,
                task.status,
                task.assignee,
                task.due_date,
                now_timestamp(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Tasks, optionally only those of one asset
    pub fn list_tasks(&self, asset_id: Option<i64>) -> Result<Vec<Task>> {
        let conn = self.connect()?;
        let tasks = match asset_id {
            None => {
                let mut stmt = conn.prepare(&format!("SELECT {TASK_COLUMNS} FROM tasks ORDER BY id"))?;
                stmt.query_map([], row_to_task)?
                    .collect::<rusqlite::Result<Vec<_>>>()?
            }
            Some(asset_id) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {TASK_COLUMNS} FROM tasks WHERE asset_id = ?1 ORDER BY id"
                ))?;
                stmt.query_map([asset_id], row_to_task)?
                    .collect::<rusqlite::Result<Vec<_>>>()?
            }
        };
        Ok(tasks)
    }

    pub fn get_task(&self, id: i64) -> Result<Option<Task>> {
        let conn = self.connect()?;
        conn.query_row(
            &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
            [id],
            row_to_task,
        )
        .optional()
        .map_err(Into::into)
    }

    pub fn update_task(&self, id: i64, update: TaskUpdate) -> Result<bool> {
        let mut changes = Changes::default();
        changes.id("asset_id", update.asset.map(AssetRef::id));
        changes.text("name", update.name);
        changes.text("status", update.status);
        changes.text("assignee", update.assignee);
        changes.text("due_date", update.due_date);
        self.update_row(EntityKind::Task, id, changes)
    }

    pub fn delete_task(&self, id: i64) -> Result<bool> {
        self.delete_row(EntityKind::Task, id)
    }
}

fn row_to_task(row: &rusqlite::Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        asset_id: row.get(1)?,
        name: row.get(2)?,
        status: row.get(3)?,
        assignee: row.get(4)?,
        due_date: row.get(5)?,
        created_at: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use crate::model::{NewAsset, NewTask, TaskUpdate};
    use crate::storage::sqlite::test_support::temp_store;

    #[test]
    fn test_task_crud() {
        let (_dir, store) = temp_store();
        let hero = store.require_asset(store.create_asset(&NewAsset::new("Hero", "character")).unwrap()).unwrap();
        let car = store.require_asset(store.create_asset(&NewAsset::new("Car", "prop")).unwrap()).unwrap();

        let mut model = NewTask::new(hero, "Model");
        model.assignee = Some("mira".to_string());
        model.due_date = Some("2025-02-01".to_string());
        let model_id = store.create_task(&model).unwrap();
        store.create_task(&NewTask::new(car, "Rig")).unwrap();
        store.create_task(&NewTask::new(hero, "Texture")).unwrap();

        assert_eq!(store.list_tasks(None).unwrap().len(), 3);
        let hero_tasks: Vec<String> = store
            .list_tasks(Some(hero.id()))
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(hero_tasks, vec!["Model", "Texture"]);

        let task = store.get_task(model_id).unwrap().unwrap();
        assert_eq!(task.status, "todo");
        assert_eq!(task.assignee.as_deref(), Some("mira"));
        assert_eq!(task.due_date.as_deref(), Some("2025-02-01"));

        assert!(store.delete_task(model_id).unwrap());
        assert!(!store.task_exists(model_id).unwrap());
    }

    #[test]
    fn test_reassign_task_to_other_asset() {
        let (_dir, store) = temp_store();
        let hero = store.require_asset(store.create_asset(&NewAsset::new("Hero", "character")).unwrap()).unwrap();
        let car = store.require_asset(store.create_asset(&NewAsset::new("Car", "prop")).unwrap()).unwrap();
        let id = store.create_task(&NewTask::new(hero, "Model")).unwrap();

        let update = TaskUpdate {
            asset: Some(car),
            status: Some("in_progress".to_string()),
            ..Default::default()
        };
        assert!(store.update_task(id, update).unwrap());

        let task = store.get_task(id).unwrap().unwrap();
        assert_eq!(task.asset_id, car.id());
        assert_eq!(task.status, "in_progress");
        assert_eq!(task.name, "Model");
        assert!(!store.update_task(id, TaskUpdate::default()).unwrap());
    }
}
