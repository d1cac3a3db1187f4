//! SQLite storage implementation
//!
//! `SqliteStore` only holds the file path. Every operation opens its own
//! short-lived connection, runs, commits and closes, so nothing is shared
//! between calls except the file itself.

use std::path::{Path, PathBuf};

use rusqlite::types::Value;
use rusqlite::{Connection, params_from_iter};

use super::migrate;
use crate::config::ensure_db_dir;
use crate::model::{AssetRef, EntityKind, ProjectRef, ShotRef};
use crate::{Error, Result};

/// SQLite-backed storage for production data
#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    /// Point at a database file. Nothing is opened until the first call.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the parent directory and bring the schema up to date.
    ///
    /// Returns how many migrations were applied; 0 when already current.
    pub fn init(&self) -> Result<usize> {
        ensure_db_dir(&self.path)?;
        let mut conn = self.connect()?;
        migrate::run_migrations(&mut conn)
    }

    /// Current schema version of the file
    pub fn schema_version(&self) -> Result<i64> {
        let conn = self.connect()?;
        migrate::current_version(&conn)
    }

    /// Open a fresh connection to the database file.
    ///
    /// Engine-level foreign keys stay off: older rows predate the
    /// constrained columns, and integrity is checked by callers instead.
    pub(crate) fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.execute_batch("PRAGMA foreign_keys = OFF;")?;
        Ok(conn)
    }

    // ========== Existence gates ==========

    /// Check whether a row of `kind` with this id exists
    pub fn exists(&self, kind: EntityKind, id: i64) -> Result<bool> {
        let conn = self.connect()?;
        id_exists(&conn, kind, id)
    }

    /// Fail with `Error::NotFound` unless the row exists
    pub fn require(&self, kind: EntityKind, id: i64) -> Result<()> {
        if self.exists(kind, id)? {
            Ok(())
        } else {
            Err(Error::NotFound { kind, id })
        }
    }

    pub fn project_exists(&self, id: i64) -> Result<bool> {
        self.exists(EntityKind::Project, id)
    }

    pub fn shot_exists(&self, id: i64) -> Result<bool> {
        self.exists(EntityKind::Shot, id)
    }

    pub fn asset_exists(&self, id: i64) -> Result<bool> {
        self.exists(EntityKind::Asset, id)
    }

    pub fn task_exists(&self, id: i64) -> Result<bool> {
        self.exists(EntityKind::Task, id)
    }

    pub fn approval_exists(&self, id: i64) -> Result<bool> {
        self.exists(EntityKind::Approval, id)
    }

    pub fn schedule_exists(&self, id: i64) -> Result<bool> {
        self.exists(EntityKind::Schedule, id)
    }

    /// Verified handle for attaching children to a project
    pub fn require_project(&self, id: i64) -> Result<ProjectRef> {
        self.require(EntityKind::Project, id)?;
        Ok(ProjectRef::verified(id))
    }

    /// Verified handle for attaching assets to a shot
    pub fn require_shot(&self, id: i64) -> Result<ShotRef> {
        self.require(EntityKind::Shot, id)?;
        Ok(ShotRef::verified(id))
    }

    /// Verified handle for attaching tasks, approvals and schedules to an asset
    pub fn require_asset(&self, id: i64) -> Result<AssetRef> {
        self.require(EntityKind::Asset, id)?;
        Ok(AssetRef::verified(id))
    }

    // ========== Shared row helpers ==========

    /// Apply a partial update. Returns false without opening the file when
    /// `changes` is empty.
    pub(crate) fn update_row(&self, kind: EntityKind, id: i64, changes: Changes) -> Result<bool> {
        if changes.is_empty() {
            return Ok(false);
        }

        let assignments: Vec<String> = changes
            .columns
            .iter()
            .enumerate()
            .map(|(i, (column, _))| format!("{} = ?{}", column, i + 1))
            .collect();
        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{}",
            kind.table(),
            assignments.join(", "),
            changes.columns.len() + 1
        );

        let mut values: Vec<Value> = changes.columns.into_iter().map(|(_, v)| v).collect();
        values.push(Value::Integer(id));

        let conn = self.connect()?;
        conn.execute(&sql, params_from_iter(values))?;
        Ok(true)
    }

    /// Delete exactly one row by id. Never cascades.
    pub(crate) fn delete_row(&self, kind: EntityKind, id: i64) -> Result<bool> {
        let conn = self.connect()?;
        let removed = conn.execute(&format!("DELETE FROM {} WHERE id = ?1", kind.table()), [id])?;
        Ok(removed > 0)
    }
}

/// Column assignments collected from a partial update
#[derive(Debug, Default)]
pub(crate) struct Changes {
    columns: Vec<(&'static str, Value)>,
}

impl Changes {
    pub(crate) fn text(&mut self, column: &'static str, value: Option<String>) {
        if let Some(v) = value {
            self.columns.push((column, Value::Text(v)));
        }
    }

    pub(crate) fn id(&mut self, column: &'static str, value: Option<i64>) {
        if let Some(v) = value {
            self.columns.push((column, Value::Integer(v)));
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

pub(crate) fn id_exists(conn: &Connection, kind: EntityKind, id: i64) -> Result<bool> {
    let mut stmt = conn.prepare(&format!("SELECT 1 FROM {} WHERE id = ?1 LIMIT 1", kind.table()))?;
    Ok(stmt.exists([id])?)
}

/// UTC creation timestamp, lexicographically sortable
pub(crate) fn now_timestamp() -> String {
    chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.6fZ")
        .to_string()
}
