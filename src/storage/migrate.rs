//! Migration runner
//!
//! Reads the highest recorded version, then applies every newer registry
//! entry in order. Each migration's steps and its version row commit in a
//! single transaction, so a failed migration leaves the recorded version at
//! the last one that fully succeeded.

use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, info, warn};

use super::schema::{MIGRATIONS, Migration};
use crate::{Error, Result};

/// Current schema version (0 when `schema_migrations` does not exist yet)
pub fn current_version(conn: &Connection) -> Result<i64> {
    let has_table = conn
        .query_row(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'schema_migrations'",
            [],
            |row| row.get::<_, String>(0),
        )
        .optional()?
        .is_some();
    if !has_table {
        return Ok(0);
    }

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

/// Apply every pending migration. Returns how many were applied.
pub fn run_migrations(conn: &mut Connection) -> Result<usize> {
    migrate_with(conn, MIGRATIONS, None)
}

/// Apply pending migrations up to and including `target`.
pub fn migrate_to(conn: &mut Connection, target: i64) -> Result<usize> {
    migrate_with(conn, MIGRATIONS, Some(target))
}

pub(crate) fn migrate_with(
    conn: &mut Connection,
    migrations: &[Migration],
    target: Option<i64>,
) -> Result<usize> {
    let current = current_version(conn)?;
    let mut applied = 0;

    for migration in migrations {
        if migration.version <= current {
            continue;
        }
        if target.is_some_and(|t| migration.version > t) {
            break;
        }
        apply(conn, migration)?;
        info!("Applied migration v{}: {}", migration.version, migration.name);
        applied += 1;
    }

    if applied == 0 {
        debug!("Schema already at v{}", current);
    }
    Ok(applied)
}

fn apply(conn: &mut Connection, migration: &Migration) -> Result<()> {
    let fail = |source: rusqlite::Error| Error::Migration {
        version: migration.version,
        name: migration.name,
        source,
    };

    // Dropping the transaction on an early return rolls it back.
    let tx = conn.transaction().map_err(fail)?;
    for step in migration.steps {
        match tx.execute_batch(step) {
            Ok(()) => {}
            Err(e) if Migration::is_add_column(step) && is_duplicate_column(&e) => {
                warn!(
                    "Migration v{} ({}): column already present, skipping: {}",
                    migration.version, migration.name, e
                );
            }
            Err(e) => return Err(fail(e)),
        }
    }
    tx.execute(
        "INSERT OR IGNORE INTO schema_migrations (version) VALUES (?1)",
        [migration.version],
    )
    .map_err(fail)?;
    tx.commit().map_err(fail)
}

fn is_duplicate_column(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(_, Some(msg)) if msg.contains("duplicate column name")
    )
}
