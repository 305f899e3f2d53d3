//! Hospital database operations.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};

use super::sql::{get_ts, ts};
use super::{DbResult, Store};
use crate::models::{BloodGroup, Hospital};

const HOSPITAL_COLUMNS: &str = "id, name, address, city, state, pincode, latitude, longitude, \
                                contact, created_at, updated_at";

fn hospital_from_row(row: &Row<'_>) -> rusqlite::Result<Hospital> {
    Ok(Hospital {
        id: row.get(0)?,
        name: row.get(1)?,
        address: row.get(2)?,
        city: row.get(3)?,
        state: row.get(4)?,
        pincode: row.get(5)?,
        latitude: row.get(6)?,
        longitude: row.get(7)?,
        contact: row.get(8)?,
        created_at: get_ts(row, 9)?,
        updated_at: get_ts(row, 10)?,
    })
}

pub trait HospitalRepo: Store {
    /// Insert a new hospital.
    fn insert_hospital(&self, hospital: &Hospital) -> DbResult<()> {
        self.conn().execute(
            r#"
            INSERT INTO hospitals (
                id, name, address, city, state, pincode, latitude, longitude,
                contact, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                hospital.id,
                hospital.name,
                hospital.address,
                hospital.city,
                hospital.state,
                hospital.pincode,
                hospital.latitude,
                hospital.longitude,
                hospital.contact,
                ts(&hospital.created_at),
                ts(&hospital.updated_at),
            ],
        )?;
        Ok(())
    }

    /// Update an existing hospital.
    fn update_hospital(&self, hospital: &Hospital) -> DbResult<bool> {
        let rows_affected = self.conn().execute(
            r#"
            UPDATE hospitals SET
                name = ?2,
                address = ?3,
                city = ?4,
                state = ?5,
                pincode = ?6,
                latitude = ?7,
                longitude = ?8,
                contact = ?9,
                updated_at = ?10
            WHERE id = ?1
            "#,
            params![
                hospital.id,
                hospital.name,
                hospital.address,
                hospital.city,
                hospital.state,
                hospital.pincode,
                hospital.latitude,
                hospital.longitude,
                hospital.contact,
                ts(&hospital.updated_at),
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get a hospital by ID.
    fn get_hospital(&self, id: &str) -> DbResult<Option<Hospital>> {
        let sql = format!("SELECT {} FROM hospitals WHERE id = ?", HOSPITAL_COLUMNS);
        self.conn()
            .query_row(&sql, [id], hospital_from_row)
            .optional()
            .map_err(Into::into)
    }

    /// List all hospitals in registration order.
    fn list_hospitals(&self) -> DbResult<Vec<Hospital>> {
        let sql = format!("SELECT {} FROM hospitals ORDER BY rowid", HOSPITAL_COLUMNS);
        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map([], hospital_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Every hospital with its usable units of one group, in registration
    /// order. Hospitals holding none report zero.
    fn hospitals_with_stock(
        &self,
        blood_group: BloodGroup,
        now: DateTime<Utc>,
    ) -> DbResult<Vec<(Hospital, u32)>> {
        let sql = format!(
            r#"
            SELECT {}, (
                SELECT COALESCE(SUM(b.quantity), 0) FROM inventory_batches b
                WHERE b.hospital_id = hospitals.id
                  AND b.blood_group = ?1
                  AND b.expiry_date > ?2
            )
            FROM hospitals
            ORDER BY rowid
            "#,
            HOSPITAL_COLUMNS
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map(params![blood_group, ts(&now)], |row| {
            Ok((hospital_from_row(row)?, row.get(11)?))
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Delete a hospital. Its inventory goes with it.
    fn delete_hospital(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn()
            .execute("DELETE FROM hospitals WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }
}

impl<S: Store + ?Sized> HospitalRepo for S {}
