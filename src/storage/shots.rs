//! Shot repository

use rusqlite::{OptionalExtension, params};

use super::sqlite::{Changes, SqliteStore, now_timestamp};
use crate::Result;
use crate::model::{EntityKind, NewShot, ProjectRef, Shot, ShotUpdate};

const SHOT_COLUMNS: &str = "id, project_id, code, name, created_at";

impl SqliteStore {
    /// Insert a shot under an already-verified project
    pub fn create_shot(&self, shot: &NewShot) -> Result<i64> {
        let conn = self.connect()?;
        conn.execute(
            r#"
            INSERT INTO shots (project_id, code, name, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![shot.project.id(), shot.code, shot.name, now_timestamp()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Shots, optionally only those of one project
    pub fn list_shots(&self, project_id: Option<i64>) -> Result<Vec<Shot>> {
        let conn = self.connect()?;
        let shots = match project_id {
            None => {
                let mut stmt = conn.prepare(&format!("SELECT {SHOT_COLUMNS} FROM shots ORDER BY id"))?;
                stmt.query_map([], row_to_shot)?
                    .collect::<rusqlite::Result<Vec<_>>>()?
            }
            Some(project_id) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {SHOT_COLUMNS} FROM shots WHERE project_id = ?1 ORDER BY id"
                ))?;
                stmt.query_map([project_id], row_to_shot)?
                    .collect::<rusqlite::Result<Vec<_>>>()?
            }
        };
        Ok(shots)
    }

    pub fn get_shot(&self, id: i64) -> Result<Option<Shot>> {
        let conn = self.connect()?;
        conn.query_row(
            &format!("SELECT {SHOT_COLUMNS} FROM shots WHERE id = ?1"),
            [id],
            row_to_shot,
        )
        .optional()
        .map_err(Into::into)
    }

    pub fn update_shot(&self, id: i64, update: ShotUpdate) -> Result<bool> {
        let mut changes = Changes::default();
        changes.id("project_id", update.project.map(ProjectRef::id));
        changes.text("code", update.code);
        changes.text("name", update.name);
        self.update_row(EntityKind::Shot, id, changes)
    }

    /// Delete the shot row only; assets pointing at it keep their shot_id.
    pub fn delete_shot(&self, id: i64) -> Result<bool> {
        self.delete_row(EntityKind::Shot, id)
    }
}

fn row_to_shot(row: &rusqlite::Row) -> rusqlite::Result<Shot> {
    Ok(Shot {
        id: row.get(0)?,
        project_id: row.get(1)?,
        code: row.get(2)?,
        name: row.get(3)?,
        created_at: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use crate::model::{NewProject, NewShot, ShotUpdate};
    use crate::storage::sqlite::test_support::temp_store;

    #[test]
    fn test_shot_crud_and_filter() {
        let (_dir, store) = temp_store();
        let film = store.create_project(&NewProject::new("Film", "FILM")).unwrap();
        let promo = store.create_project(&NewProject::new("Promo", "PRM")).unwrap();
        let film_ref = store.require_project(film).unwrap();
        let promo_ref = store.require_project(promo).unwrap();

        let s010 = store.create_shot(&NewShot::new(film_ref, "S010", "Opening")).unwrap();
        store.create_shot(&NewShot::new(promo_ref, "P010", "Teaser")).unwrap();
        store.create_shot(&NewShot::new(film_ref, "S020", "Chase")).unwrap();

        assert_eq!(store.list_shots(None).unwrap().len(), 3);

        let film_shots = store.list_shots(Some(film)).unwrap();
        let codes: Vec<&str> = film_shots.iter().map(|s| s.code.as_str()).collect();
        assert_eq!(codes, vec!["S010", "S020"]);

        let shot = store.get_shot(s010).unwrap().unwrap();
        assert_eq!(shot.project_id, film);
        assert_eq!(shot.name, "Opening");

        assert!(store.delete_shot(s010).unwrap());
        assert!(!store.shot_exists(s010).unwrap());
        assert!(!store.delete_shot(s010).unwrap());
    }

    #[test]
    fn test_move_shot_between_projects() {
        let (_dir, store) = temp_store();
        let film = store.create_project(&NewProject::new("Film", "FILM")).unwrap();
        let promo = store.create_project(&NewProject::new("Promo", "PRM")).unwrap();
        let shot = store
            .create_shot(&NewShot::new(store.require_project(film).unwrap(), "S010", "Opening"))
            .unwrap();

        let update = ShotUpdate {
            project: Some(store.require_project(promo).unwrap()),
            ..Default::default()
        };
        assert!(store.update_shot(shot, update).unwrap());

        let moved = store.get_shot(shot).unwrap().unwrap();
        assert_eq!(moved.project_id, promo);
        assert_eq!(moved.code, "S010");
        assert!(store.list_shots(Some(film)).unwrap().is_empty());
    }
}
