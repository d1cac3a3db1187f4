//! Storage Layer - SQLite-backed persistence
//!
//! One SQLite file holds every table:
//! - projects(id, name, code, created_at)
//! - shots(id, project_id, code, name, created_at)
//! - assets(id, name, asset_type, status, created_at, project_id, shot_id)
//! - tasks(id, asset_id, name, status, assignee, due_date, created_at)
//! - approvals(id, asset_id, status, note, created_at)
//! - schedules(id, asset_id, task, due_date, status, created_at)
//! - schema_migrations(version)
//!
//! Referential integrity is the caller's job: use the `require_*` gates
//! before creating children, and `purge` to remove a project with its tree.

use std::path::Path;

use tracing::debug;

use crate::Result;
use crate::config::DbLocation;

pub mod cascade;
pub mod migrate;
pub mod schema;
pub mod sqlite;

mod approvals;
mod assets;
mod projects;
mod report;
mod schedules;
mod shots;
mod tasks;

pub use assets::AssetFilter;
pub use cascade::{PurgeReport, PurgeScope};
pub use report::{EntityCounts, Summary};
pub use sqlite::SqliteStore;

/// Resolve the database path, create it if needed and migrate it.
///
/// Returns the store and how many migrations were applied.
pub fn init(location: &DbLocation, explicit: Option<&Path>) -> Result<(SqliteStore, usize)> {
    let path = location.resolve(explicit);
    debug!(path = %path.display(), "Opening database");
    let store = SqliteStore::new(path);
    let applied = store.init()?;
    Ok((store, applied))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewAsset, NewProject, NewShot};
    use crate::storage::schema::latest_version;
    use rusqlite::Connection;

    #[test]
    fn test_init_uses_resolved_location() {
        let dir = tempfile::tempdir().unwrap();
        let configured = dir.path().join("configured").join("pipely.db");
        let location = DbLocation::new(dir.path().join("default.db"))
            .with_configured(Some(configured.clone()));

        let (store, applied) = init(&location, None).unwrap();
        assert_eq!(store.path(), configured.as_path());
        assert_eq!(applied as i64, latest_version());

        let (_, again) = init(&location, None).unwrap();
        assert_eq!(again, 0);
    }

    #[test]
    fn test_explicit_path_wins() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = dir.path().join("explicit.db");
        let location = DbLocation::new(dir.path().join("default.db"))
            .with_env_override(Some(dir.path().join("env.db")));

        let (store, _) = init(&location, Some(&explicit)).unwrap();
        assert_eq!(store.path(), explicit.as_path());
        assert!(explicit.exists());
        assert!(!dir.path().join("env.db").exists());
    }

    #[test]
    fn test_upgrade_from_older_schema_keeps_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("old.db");

        // A file last touched by a release that stopped at version 6.
        {
            let mut conn = Connection::open(&path).unwrap();
            migrate::migrate_to(&mut conn, 6).unwrap();
            conn.execute(
                "INSERT INTO projects (name, code, created_at) VALUES ('Film', 'FILM', '2024-01-01T00:00:00.000000Z')",
                [],
            )
            .unwrap();
            conn.execute(
                "INSERT INTO assets (name, asset_type, status, created_at) VALUES ('Hero', 'character', 'todo', '2024-01-01T00:00:00.000000Z')",
                [],
            )
            .unwrap();
        }

        let (store, applied) = init(&DbLocation::new(&path), None).unwrap();
        assert_eq!(applied as i64, latest_version() - 6);
        assert_eq!(store.schema_version().unwrap(), latest_version());

        let project = store.list_projects().unwrap().remove(0);
        assert_eq!(project.name, "Film");

        let asset = store.list_assets(AssetFilter::default()).unwrap().remove(0);
        assert_eq!(asset.name, "Hero");
        assert!(asset.project_id.is_none());

        // New columns are usable straight away.
        let project_ref = store.require_project(project.id).unwrap();
        store.create_project(&NewProject::new("Promo", "PRM")).unwrap();
        store.create_asset(&NewAsset::new("Car", "prop").in_project(project_ref)).unwrap();
        assert_eq!(store.list_assets(AssetFilter::project(project.id)).unwrap().len(), 1);
    }

    #[test]
    fn test_upgrade_heals_v8_file_missing_shot_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.db");

        // Older runners dropped the whole of v7 on a duplicate project_id
        // column, then still recorded v8: shot_id never landed.
        {
            let mut conn = Connection::open(&path).unwrap();
            migrate::migrate_to(&mut conn, 6).unwrap();
            conn.execute_batch(
                r#"
                ALTER TABLE assets ADD COLUMN project_id INTEGER;
                INSERT INTO assets (name, asset_type, status, created_at, project_id)
                    VALUES ('Hero', 'character', 'todo', '2024-01-01T00:00:00.000000Z', NULL);
                "#,
            )
            .unwrap();
            conn.execute_batch(schema::CREATE_TASKS_TABLE).unwrap();
            conn.execute("INSERT INTO schema_migrations (version) VALUES (8)", []).unwrap();
        }

        let (store, applied) = init(&DbLocation::new(&path), None).unwrap();
        assert_eq!(applied, 1);
        assert_eq!(store.schema_version().unwrap(), latest_version());

        let assets = store.list_assets(AssetFilter::default()).unwrap();
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].name, "Hero");
        assert!(assets[0].shot_id.is_none());

        let film = store.create_project(&NewProject::new("Film", "FILM")).unwrap();
        let film = store.require_project(film).unwrap();
        let shot = store.create_shot(&NewShot::new(film, "S010", "Opening")).unwrap();
        let shot = store.require_shot(shot).unwrap();
        store.create_asset(&NewAsset::new("Car", "prop").in_shot(shot)).unwrap();
        assert_eq!(store.purge(PurgeScope::Project(film.id())).unwrap().assets, 1);
    }
}
