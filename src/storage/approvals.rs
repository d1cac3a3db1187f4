//! Approval repository

use rusqlite::{OptionalExtension, params};

use super::sqlite::{Changes, SqliteStore, now_timestamp};
use crate::Result;
use crate::model::{Approval, ApprovalUpdate, AssetRef, EntityKind, NewApproval};

const APPROVAL_COLUMNS: &str = "id, asset_id, status, note, created_at";

impl SqliteStore {
    pub fn create_approval(&self, approval: &NewApproval) -> Result<i64> {
        let conn = self.connect()?;
        conn.execute(
            r#"
            INSERT INTO approvals (asset_id, status, note, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                approval.asset.id(),
                approval.status,
                approval.note,
                now_timestamp(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Approvals, optionally only those of one asset
    pub fn list_approvals(&self, asset_id: Option<i64>) -> Result<Vec<Approval>> {
        let conn = self.connect()?;
        let approvals = match asset_id {
            None => {
                let mut stmt =
                    conn.prepare(&format!("SELECT {APPROVAL_COLUMNS} FROM approvals ORDER BY id"))?;
                stmt.query_map([], row_to_approval)?
                    .collect::<rusqlite::Result<Vec<_>>>()?
            }
            Some(asset_id) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {APPROVAL_COLUMNS} FROM approvals WHERE asset_id = ?1 ORDER BY id"
                ))?;
                stmt.query_map([asset_id], row_to_approval)?
                    .collect::<rusqlite::Result<Vec<_>>>()?
            }
        };
        Ok(approvals)
    }

    pub fn get_approval(&self, id: i64) -> Result<Option<Approval>> {
        let conn = self.connect()?;
        conn.query_row(
            &format!("SELECT {APPROVAL_COLUMNS} FROM approvals WHERE id = ?1"),
            [id],
            row_to_approval,
        )
        .optional()
        .map_err(Into::into)
    }

    pub fn update_approval(&self, id: i64, update: ApprovalUpdate) -> Result<bool> {
        let mut changes = Changes::default();
        changes.id("asset_id", update.asset.map(AssetRef::id));
        changes.text("status", update.status);
        changes.text("note", update.note);
        self.update_row(EntityKind::Approval, id, changes)
    }

    pub fn delete_approval(&self, id: i64) -> Result<bool> {
        self.delete_row(EntityKind::Approval, id)
    }
}

fn row_to_approval(row: &rusqlite::Row) -> rusqlite::Result<Approval> {
    Ok(Approval {
        id: row.get(0)?,
        asset_id: row.get(1)?,
        status: row.get(2)?,
        note: row.get(3)?,
        created_at: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use crate::model::{ApprovalUpdate, NewApproval, NewAsset};
    use crate::storage::sqlite::test_support::temp_store;

    #[test]
    fn test_approval_crud() {
        let (_dir, store) = temp_store();
        let hero = store.require_asset(store.create_asset(&NewAsset::new("Hero", "character")).unwrap()).unwrap();

        let mut first = NewApproval::new(hero, "needs_changes");
        first.note = Some("Silhouette reads weak".to_string());
        let first_id = store.create_approval(&first).unwrap();
        let second_id = store.create_approval(&NewApproval::new(hero, "approved")).unwrap();

        let listed = store.list_approvals(Some(hero.id())).unwrap();
        assert_eq!(listed.iter().map(|a| a.id).collect::<Vec<_>>(), vec![first_id, second_id]);
        assert_eq!(listed[0].note.as_deref(), Some("Silhouette reads weak"));
        assert!(listed[1].note.is_none());

        assert!(store.list_approvals(Some(999)).unwrap().is_empty());

        assert!(store.delete_approval(first_id).unwrap());
        assert_eq!(store.list_approvals(None).unwrap().len(), 1);
    }

    #[test]
    fn test_update_note_keeps_status() {
        let (_dir, store) = temp_store();
        let hero = store.require_asset(store.create_asset(&NewAsset::new("Hero", "character")).unwrap()).unwrap();
        let id = store.create_approval(&NewApproval::new(hero, "rejected")).unwrap();

        let update = ApprovalUpdate {
            note: Some("Retake lighting".to_string()),
            ..Default::default()
        };
        assert!(store.update_approval(id, update).unwrap());

        let approval = store.get_approval(id).unwrap().unwrap();
        assert_eq!(approval.status, "rejected");
        assert_eq!(approval.note.as_deref(), Some("Retake lighting"));
    }
}
