//! Blood request database operations.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};

use super::sql::{get_ts, ts};
use super::{DbResult, Store};
use crate::models::{BloodRequest, RequestStatus};

const REQUEST_COLUMNS: &str = "id, receiver_id, hospital_id, blood_group, units_required, \
                               is_emergency, latitude, longitude, status, created_at, updated_at";

fn request_from_row(row: &Row<'_>) -> rusqlite::Result<BloodRequest> {
    Ok(BloodRequest {
        id: row.get(0)?,
        receiver_id: row.get(1)?,
        hospital_id: row.get(2)?,
        blood_group: row.get(3)?,
        units_required: row.get(4)?,
        is_emergency: row.get(5)?,
        latitude: row.get(6)?,
        longitude: row.get(7)?,
        status: row.get(8)?,
        created_at: get_ts(row, 9)?,
        updated_at: get_ts(row, 10)?,
    })
}

pub trait RequestRepo: Store {
    fn insert_request(&self, request: &BloodRequest) -> DbResult<()> {
        self.conn().execute(
            r#"
            INSERT INTO blood_requests (
                id, receiver_id, hospital_id, blood_group, units_required,
                is_emergency, latitude, longitude, status, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                request.id,
                request.receiver_id,
                request.hospital_id,
                request.blood_group,
                request.units_required,
                request.is_emergency,
                request.latitude,
                request.longitude,
                request.status,
                ts(&request.created_at),
                ts(&request.updated_at),
            ],
        )?;
        Ok(())
    }

    fn get_request(&self, id: &str) -> DbResult<Option<BloodRequest>> {
        let sql = format!("SELECT {} FROM blood_requests WHERE id = ?", REQUEST_COLUMNS);
        self.conn()
            .query_row(&sql, [id], request_from_row)
            .optional()
            .map_err(Into::into)
    }

    /// All requests, newest first.
    fn list_requests(&self) -> DbResult<Vec<BloodRequest>> {
        let sql = format!(
            "SELECT {} FROM blood_requests ORDER BY created_at DESC, rowid DESC",
            REQUEST_COLUMNS
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map([], request_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Requests raised by or fulfilled at a hospital, newest first.
    fn list_requests_for_hospital(&self, hospital_id: &str) -> DbResult<Vec<BloodRequest>> {
        let sql = format!(
            "SELECT {} FROM blood_requests WHERE hospital_id = ? \
             ORDER BY created_at DESC, rowid DESC",
            REQUEST_COLUMNS
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map([hospital_id], request_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Move a request out of `PENDING`, optionally re-pointing its hospital.
    ///
    /// Only pending rows are touched; returns false when the request is
    /// missing or already terminal.
    fn close_request(
        &self,
        id: &str,
        status: RequestStatus,
        hospital_id: Option<&str>,
        at: DateTime<Utc>,
    ) -> DbResult<bool> {
        let rows_affected = self.conn().execute(
            r#"
            UPDATE blood_requests SET
                status = ?2,
                hospital_id = COALESCE(?3, hospital_id),
                updated_at = ?4
            WHERE id = ?1 AND status = 'PENDING'
            "#,
            params![id, status, hospital_id, ts(&at)],
        )?;
        Ok(rows_affected > 0)
    }

    fn delete_request(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn()
            .execute("DELETE FROM blood_requests WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }
}

impl<S: Store + ?Sized> RequestRepo for S {}
