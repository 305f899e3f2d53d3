//! Inventory batch database operations.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};

use super::sql::{get_opt_ts, get_ts, ts};
use super::{DbResult, Store};
use crate::models::{BloodGroup, InventoryBatch, LowStockAlert, StockLevel};

const BATCH_COLUMNS: &str = "id, hospital_id, blood_group, quantity, expiry_date, donation_id, \
                             min_quantity, created_at, updated_at";

fn batch_from_row(row: &Row<'_>) -> rusqlite::Result<InventoryBatch> {
    Ok(InventoryBatch {
        id: row.get(0)?,
        hospital_id: row.get(1)?,
        blood_group: row.get(2)?,
        quantity: row.get(3)?,
        expiry_date: get_ts(row, 4)?,
        donation_id: row.get(5)?,
        min_quantity: row.get(6)?,
        created_at: get_ts(row, 7)?,
        updated_at: get_ts(row, 8)?,
    })
}

/// Position of a group in the canonical listing order.
fn group_rank(group: BloodGroup) -> usize {
    BloodGroup::ALL
        .iter()
        .position(|g| *g == group)
        .unwrap_or(BloodGroup::ALL.len())
}

pub trait InventoryRepo: Store {
    /// Insert a new batch.
    fn insert_batch(&self, batch: &InventoryBatch) -> DbResult<()> {
        self.conn().execute(
            r#"
            INSERT INTO inventory_batches (
                id, hospital_id, blood_group, quantity, expiry_date, donation_id,
                min_quantity, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                batch.id,
                batch.hospital_id,
                batch.blood_group,
                batch.quantity,
                ts(&batch.expiry_date),
                batch.donation_id,
                batch.min_quantity,
                ts(&batch.created_at),
                ts(&batch.updated_at),
            ],
        )?;
        Ok(())
    }

    /// Overwrite the mutable fields of a batch.
    fn update_batch(&self, batch: &InventoryBatch) -> DbResult<bool> {
        let rows_affected = self.conn().execute(
            r#"
            UPDATE inventory_batches SET
                blood_group = ?2,
                quantity = ?3,
                expiry_date = ?4,
                min_quantity = ?5,
                updated_at = ?6
            WHERE id = ?1
            "#,
            params![
                batch.id,
                batch.blood_group,
                batch.quantity,
                ts(&batch.expiry_date),
                batch.min_quantity,
                ts(&batch.updated_at),
            ],
        )?;
        Ok(rows_affected > 0)
    }

    fn get_batch(&self, id: &str) -> DbResult<Option<InventoryBatch>> {
        let sql = format!("SELECT {} FROM inventory_batches WHERE id = ?", BATCH_COLUMNS);
        self.conn()
            .query_row(&sql, [id], batch_from_row)
            .optional()
            .map_err(Into::into)
    }

    /// Every batch, expired ones included.
    fn list_batches(&self) -> DbResult<Vec<InventoryBatch>> {
        let sql = format!(
            "SELECT {} FROM inventory_batches ORDER BY hospital_id, expiry_date, rowid",
            BATCH_COLUMNS
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map([], batch_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    fn list_batches_for_hospital(&self, hospital_id: &str) -> DbResult<Vec<InventoryBatch>> {
        let sql = format!(
            "SELECT {} FROM inventory_batches WHERE hospital_id = ? ORDER BY expiry_date, rowid",
            BATCH_COLUMNS
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map([hospital_id], batch_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Usable batches of one group, soonest expiry first; ties keep
    /// insertion order.
    fn fifo_batches(
        &self,
        hospital_id: &str,
        blood_group: BloodGroup,
        now: DateTime<Utc>,
    ) -> DbResult<Vec<InventoryBatch>> {
        let sql = format!(
            r#"
            SELECT {} FROM inventory_batches
            WHERE hospital_id = ?1 AND blood_group = ?2 AND expiry_date > ?3
            ORDER BY expiry_date, rowid
            "#,
            BATCH_COLUMNS
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map(params![hospital_id, blood_group, ts(&now)], batch_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Total usable units of one group at a hospital.
    fn available_units(
        &self,
        hospital_id: &str,
        blood_group: BloodGroup,
        now: DateTime<Utc>,
    ) -> DbResult<u32> {
        self.conn()
            .query_row(
                r#"
                SELECT COALESCE(SUM(quantity), 0) FROM inventory_batches
                WHERE hospital_id = ?1 AND blood_group = ?2 AND expiry_date > ?3
                "#,
                params![hospital_id, blood_group, ts(&now)],
                |row| row.get(0),
            )
            .map_err(Into::into)
    }

    /// The usable batch of one group that expires last, if any.
    fn latest_live_batch(
        &self,
        hospital_id: &str,
        blood_group: BloodGroup,
        now: DateTime<Utc>,
    ) -> DbResult<Option<InventoryBatch>> {
        let sql = format!(
            r#"
            SELECT {} FROM inventory_batches
            WHERE hospital_id = ?1 AND blood_group = ?2 AND expiry_date > ?3
            ORDER BY expiry_date DESC, rowid DESC
            LIMIT 1
            "#,
            BATCH_COLUMNS
        );
        self.conn()
            .query_row(&sql, params![hospital_id, blood_group, ts(&now)], batch_from_row)
            .optional()
            .map_err(Into::into)
    }

    /// Add units to a batch, keeping the later of the two expiries.
    fn merge_into_batch(
        &self,
        id: &str,
        units: u32,
        expiry_date: DateTime<Utc>,
    ) -> DbResult<bool> {
        let rows_affected = self.conn().execute(
            r#"
            UPDATE inventory_batches SET
                quantity = quantity + ?2,
                expiry_date = MAX(expiry_date, ?3),
                updated_at = ?4
            WHERE id = ?1
            "#,
            params![id, units, ts(&expiry_date), ts(&Utc::now())],
        )?;
        Ok(rows_affected > 0)
    }

    /// Set the remaining quantity of a partly consumed batch.
    fn set_batch_quantity(&self, id: &str, quantity: u32) -> DbResult<bool> {
        let rows_affected = self.conn().execute(
            "UPDATE inventory_batches SET quantity = ?2, updated_at = ?3 WHERE id = ?1",
            params![id, quantity, ts(&Utc::now())],
        )?;
        Ok(rows_affected > 0)
    }

    fn delete_batch(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn()
            .execute("DELETE FROM inventory_batches WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }

    /// Per-group stock position for a hospital, in blood group order.
    fn stock_levels(&self, hospital_id: &str, now: DateTime<Utc>) -> DbResult<Vec<StockLevel>> {
        let mut stmt = self.conn().prepare(
            r#"
            SELECT
                blood_group,
                COALESCE(SUM(CASE WHEN expiry_date > ?2 THEN quantity END), 0),
                COALESCE(SUM(CASE WHEN expiry_date <= ?2 THEN quantity END), 0),
                COUNT(*),
                MIN(CASE WHEN expiry_date > ?2 THEN expiry_date END)
            FROM inventory_batches
            WHERE hospital_id = ?1
            GROUP BY blood_group
            "#,
        )?;
        let rows = stmt.query_map(params![hospital_id, ts(&now)], |row| {
            Ok(StockLevel {
                blood_group: row.get(0)?,
                available: row.get(1)?,
                expired: row.get(2)?,
                batch_count: row.get(3)?,
                earliest_expiry: get_opt_ts(row, 4)?,
            })
        })?;
        let mut levels = rows.collect::<Result<Vec<_>, _>>()?;
        levels.sort_by_key(|level| group_rank(level.blood_group));
        Ok(levels)
    }

    /// Groups whose usable stock is at or below the largest reorder
    /// threshold set on any of their batches.
    fn low_stock(&self, hospital_id: &str, now: DateTime<Utc>) -> DbResult<Vec<LowStockAlert>> {
        let mut stmt = self.conn().prepare(
            r#"
            SELECT
                hospital_id,
                blood_group,
                COALESCE(SUM(CASE WHEN expiry_date > ?2 THEN quantity END), 0) AS available,
                MAX(min_quantity) AS threshold
            FROM inventory_batches
            WHERE hospital_id = ?1
            GROUP BY hospital_id, blood_group
            HAVING available <= threshold
            "#,
        )?;
        let rows = stmt.query_map(params![hospital_id, ts(&now)], |row| {
            Ok(LowStockAlert {
                hospital_id: row.get(0)?,
                blood_group: row.get(1)?,
                available: row.get(2)?,
                threshold: row.get(3)?,
            })
        })?;
        let mut alerts = rows.collect::<Result<Vec<_>, _>>()?;
        alerts.sort_by_key(|alert| group_rank(alert.blood_group));
        Ok(alerts)
    }
}

impl<S: Store + ?Sized> InventoryRepo for S {}
