//! Camp database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::sql::{get_ts, ts};
use super::{DbResult, Store};
use crate::models::Camp;

const CAMP_COLUMNS: &str = "id, name, location, latitude, longitude, start_date, end_date, \
                            organizer, created_at, updated_at";

fn camp_from_row(row: &Row<'_>) -> rusqlite::Result<Camp> {
    Ok(Camp {
        id: row.get(0)?,
        name: row.get(1)?,
        location: row.get(2)?,
        latitude: row.get(3)?,
        longitude: row.get(4)?,
        start_date: get_ts(row, 5)?,
        end_date: get_ts(row, 6)?,
        organizer: row.get(7)?,
        created_at: get_ts(row, 8)?,
        updated_at: get_ts(row, 9)?,
    })
}

pub trait CampRepo: Store {
    fn insert_camp(&self, camp: &Camp) -> DbResult<()> {
        self.conn().execute(
            r#"
            INSERT INTO camps (
                id, name, location, latitude, longitude, start_date, end_date,
                organizer, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                camp.id,
                camp.name,
                camp.location,
                camp.latitude,
                camp.longitude,
                ts(&camp.start_date),
                ts(&camp.end_date),
                camp.organizer,
                ts(&camp.created_at),
                ts(&camp.updated_at),
            ],
        )?;
        Ok(())
    }

    fn update_camp(&self, camp: &Camp) -> DbResult<bool> {
        let rows_affected = self.conn().execute(
            r#"
            UPDATE camps SET
                name = ?2,
                location = ?3,
                latitude = ?4,
                longitude = ?5,
                start_date = ?6,
                end_date = ?7,
                organizer = ?8,
                updated_at = ?9
            WHERE id = ?1
            "#,
            params![
                camp.id,
                camp.name,
                camp.location,
                camp.latitude,
                camp.longitude,
                ts(&camp.start_date),
                ts(&camp.end_date),
                camp.organizer,
                ts(&camp.updated_at),
            ],
        )?;
        Ok(rows_affected > 0)
    }

    fn get_camp(&self, id: &str) -> DbResult<Option<Camp>> {
        let sql = format!("SELECT {} FROM camps WHERE id = ?", CAMP_COLUMNS);
        self.conn()
            .query_row(&sql, [id], camp_from_row)
            .optional()
            .map_err(Into::into)
    }

    /// Camps, soonest first.
    fn list_camps(&self) -> DbResult<Vec<Camp>> {
        let sql = format!(
            "SELECT {} FROM camps ORDER BY start_date, rowid",
            CAMP_COLUMNS
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map([], camp_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    fn delete_camp(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self.conn().execute("DELETE FROM camps WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }
}

impl<S: Store + ?Sized> CampRepo for S {}
