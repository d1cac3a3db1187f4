//! Project repository

use rusqlite::{OptionalExtension, params};

use super::sqlite::{Changes, SqliteStore, now_timestamp};
use crate::Result;
use crate::model::{EntityKind, NewProject, Project, ProjectUpdate};

const PROJECT_COLUMNS: &str = "id, name, code, created_at";

impl SqliteStore {
    /// Insert a project and return its id
    pub fn create_project(&self, project: &NewProject) -> Result<i64> {
        let conn = self.connect()?;
        conn.execute(
            r#"
            INSERT INTO projects (name, code, created_at)
            VALUES (?1, ?2, ?3)
            "#,
            params![project.name, project.code, now_timestamp()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// All projects, oldest first
    pub fn list_projects(&self) -> Result<Vec<Project>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!("SELECT {PROJECT_COLUMNS} FROM projects ORDER BY id"))?;
        let projects = stmt
            .query_map([], row_to_project)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(projects)
    }

    pub fn get_project(&self, id: i64) -> Result<Option<Project>> {
        let conn = self.connect()?;
        conn.query_row(
            &format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?1"),
            [id],
            row_to_project,
        )
        .optional()
        .map_err(Into::into)
    }

    /// Apply the supplied fields; false when none were supplied
    pub fn update_project(&self, id: i64, update: ProjectUpdate) -> Result<bool> {
        let mut changes = Changes::default();
        changes.text("name", update.name);
        changes.text("code", update.code);
        self.update_row(EntityKind::Project, id, changes)
    }

    /// Delete the project row only. Use `purge` to take its shots and assets with it.
    pub fn delete_project(&self, id: i64) -> Result<bool> {
        self.delete_row(EntityKind::Project, id)
    }
}

fn row_to_project(row: &rusqlite::Row) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get(0)?,
        name: row.get(1)?,
        code: row.get(2)?,
        created_at: row.get(3)?,
    })
}
