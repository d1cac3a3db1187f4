//! Schedule repository
//!
//! Unlike the other kinds, schedules list in due-date order (ties by id).

use rusqlite::{OptionalExtension, params};

use super::sqlite::{Changes, SqliteStore, now_timestamp};
use crate::Result;
use crate::model::{AssetRef, EntityKind, NewSchedule, Schedule, ScheduleUpdate};

const SCHEDULE_COLUMNS: &str = "id, asset_id, task, due_date, status, created_at";

impl SqliteStore {
    pub fn create_schedule(&self, schedule: &NewSchedule) -> Result<i64> {
        let conn = self.connect()?;
        conn.execute(
            r#"
            INSERT INTO schedules (asset_id, task, due_date, status, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                schedule.asset.id(),
                schedule.task,
                schedule.due_date,
                schedule.status,
                now_timestamp(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Schedule items ordered by due date, optionally for one asset
    pub fn list_schedules(&self, asset_id: Option<i64>) -> Result<Vec<Schedule>> {
        let conn = self.connect()?;
        let schedules = match asset_id {
            None => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {SCHEDULE_COLUMNS} FROM schedules ORDER BY due_date, id"
                ))?;
                stmt.query_map([], row_to_schedule)?
                    .collect::<rusqlite::Result<Vec<_>>>()?
            }
            Some(asset_id) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {SCHEDULE_COLUMNS} FROM schedules WHERE asset_id = ?1 ORDER BY due_date, id"
                ))?;
                stmt.query_map([asset_id], row_to_schedule)?
                    .collect::<rusqlite::Result<Vec<_>>>()?
            }
        };
        Ok(schedules)
    }

    pub fn get_schedule(&self, id: i64) -> Result<Option<Schedule>> {
        let conn = self.connect()?;
        conn.query_row(
            &format!("SELECT {SCHEDULE_COLUMNS} FROM schedules WHERE id = ?1"),
            [id],
            row_to_schedule,
        )
        .optional()
        .map_err(Into::into)
    }

    pub fn update_schedule(&self, id: i64, update: ScheduleUpdate) -> Result<bool> {
        let mut changes = Changes::default();
        changes.id("asset_id", update.asset.map(AssetRef::id));
        changes.text("task", update.task);
        changes.text("due_date", update.due_date);
        changes.text("status", update.status);
        self.update_row(EntityKind::Schedule, id, changes)
    }

    pub fn delete_schedule(&self, id: i64) -> Result<bool> {
        self.delete_row(EntityKind::Schedule, id)
    }
}

fn row_to_schedule(row: &rusqlite::Row) -> rusqlite::Result<Schedule> {
    Ok(Schedule {
        id: row.get(0)?,
        asset_id: row.get(1)?,
        task: row.get(2)?,
        due_date: row.get(3)?,
        status: row.get(4)?,
        created_at: row.get(5)?,
    })
}
