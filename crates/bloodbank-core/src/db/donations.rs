//! Donation event database operations.

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::sql::{get_ts, ts};
use super::{DbResult, Store};
use crate::models::DonationEvent;

const DONATION_COLUMNS: &str =
    "id, donor_id, hospital_id, camp_id, date, units_donated, created_at";

fn donation_from_row(row: &Row<'_>) -> rusqlite::Result<DonationEvent> {
    Ok(DonationEvent {
        id: row.get(0)?,
        donor_id: row.get(1)?,
        hospital_id: row.get(2)?,
        camp_id: row.get(3)?,
        date: get_ts(row, 4)?,
        units_donated: row.get(5)?,
        created_at: get_ts(row, 6)?,
    })
}

pub trait DonationRepo: Store {
    fn insert_donation(&self, donation: &DonationEvent) -> DbResult<()> {
        self.conn().execute(
            r#"
            INSERT INTO donation_events (
                id, donor_id, hospital_id, camp_id, date, units_donated, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                donation.id,
                donation.donor_id,
                donation.hospital_id,
                donation.camp_id,
                ts(&donation.date),
                donation.units_donated,
                ts(&donation.created_at),
            ],
        )?;
        Ok(())
    }

    /// Correct the date or unit count of a recorded donation.
    fn update_donation(&self, donation: &DonationEvent) -> DbResult<bool> {
        let rows_affected = self.conn().execute(
            "UPDATE donation_events SET date = ?2, units_donated = ?3 WHERE id = ?1",
            params![donation.id, ts(&donation.date), donation.units_donated],
        )?;
        Ok(rows_affected > 0)
    }

    fn get_donation(&self, id: &str) -> DbResult<Option<DonationEvent>> {
        let sql = format!("SELECT {} FROM donation_events WHERE id = ?", DONATION_COLUMNS);
        self.conn()
            .query_row(&sql, [id], donation_from_row)
            .optional()
            .map_err(Into::into)
    }

    /// All donations, most recent first.
    fn list_donations(&self) -> DbResult<Vec<DonationEvent>> {
        donations_where(self.conn(), None)
    }

    fn list_donations_by_donor(&self, donor_id: &str) -> DbResult<Vec<DonationEvent>> {
        donations_where(self.conn(), Some(("donor_id", donor_id)))
    }

    fn list_donations_by_hospital(&self, hospital_id: &str) -> DbResult<Vec<DonationEvent>> {
        donations_where(self.conn(), Some(("hospital_id", hospital_id)))
    }

    fn list_donations_by_camp(&self, camp_id: &str) -> DbResult<Vec<DonationEvent>> {
        donations_where(self.conn(), Some(("camp_id", camp_id)))
    }

    /// Delete a donation record. Batches it created keep their stock.
    fn delete_donation(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn()
            .execute("DELETE FROM donation_events WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }
}

impl<S: Store + ?Sized> DonationRepo for S {}

/// Donations, most recent first, optionally filtered on one link column.
fn donations_where(
    conn: &Connection,
    filter: Option<(&'static str, &str)>,
) -> DbResult<Vec<DonationEvent>> {
    let where_clause = filter
        .map(|(column, _)| format!("WHERE {} = ?1", column))
        .unwrap_or_default();
    let sql = format!(
        "SELECT {} FROM donation_events {} ORDER BY date DESC, rowid DESC",
        DONATION_COLUMNS, where_clause
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = match filter {
        Some((_, key)) => stmt.query_map([key], donation_from_row)?,
        None => stmt.query_map([], donation_from_row)?,
    };
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}
