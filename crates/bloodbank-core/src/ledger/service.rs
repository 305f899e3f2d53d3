//! Inventory ledger operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::fifo::{plan_fifo, BatchAction};
use crate::db::{Database, HospitalRepo, InventoryRepo, Store};
use crate::models::{
    BatchUpdate, BloodGroup, InventoryBatch, LowStockAlert, NewBatch, StockLevel,
};
use crate::{positive_units, require, BloodBankError, BloodBankResult};

/// Outcome of a successful deduction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deduction {
    pub blood_group: BloodGroup,
    pub deducted: u32,
    /// Usable units of the group left at the hospital
    pub remaining: u32,
}

/// Inventory ledger for all hospitals.
pub struct InventoryLedger<'a> {
    db: &'a Database,
}

impl<'a> InventoryLedger<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Take `units` of `blood_group` from a hospital, oldest expiry first.
    ///
    /// Either the whole amount is taken or nothing is. Not idempotent: each
    /// call consumes again.
    pub fn deduct(
        &self,
        hospital_id: &str,
        blood_group: BloodGroup,
        units: i64,
    ) -> BloodBankResult<Deduction> {
        require(hospital_id, "hospitalId")?;
        let units = positive_units(units, "unitsRequired")?;

        let deduction = self
            .db
            .unit_of_work(|uow| deduct_in(uow, hospital_id, blood_group, units, Utc::now()))?;

        info!(
            hospital_id,
            blood_group = %blood_group,
            deducted = deduction.deducted,
            remaining = deduction.remaining,
            "deducted stock"
        );
        Ok(deduction)
    }

    /// Record a batch entered by hand.
    pub fn create_batch(&self, form: NewBatch) -> BloodBankResult<InventoryBatch> {
        require(&form.hospital_id, "hospitalId")?;
        let quantity = positive_units(form.quantity, "quantity")?;
        let min_quantity = non_negative(form.min_quantity.unwrap_or(0), "minQuantity")?;

        if self.db.get_hospital(&form.hospital_id)?.is_none() {
            return Err(BloodBankError::NotFound(format!("hospital {}", form.hospital_id)));
        }

        let mut batch =
            InventoryBatch::new(form.hospital_id, form.blood_group, quantity, form.expiry_date);
        batch.min_quantity = min_quantity;
        batch.donation_id = form.donation_id.filter(|id| !id.trim().is_empty());
        self.db.insert_batch(&batch)?;

        debug!(batch_id = %batch.id, hospital_id = %batch.hospital_id, "created batch");
        Ok(batch)
    }

    pub fn get_batch(&self, id: &str) -> BloodBankResult<InventoryBatch> {
        self.db
            .get_batch(id)?
            .ok_or_else(|| BloodBankError::NotFound(format!("batch {}", id)))
    }

    pub fn list_batches(&self) -> BloodBankResult<Vec<InventoryBatch>> {
        Ok(self.db.list_batches()?)
    }

    pub fn list_for_hospital(&self, hospital_id: &str) -> BloodBankResult<Vec<InventoryBatch>> {
        Ok(self.db.list_batches_for_hospital(hospital_id)?)
    }

    /// Correct a stored batch. The hospital and donation link never change.
    pub fn update_batch(&self, id: &str, update: BatchUpdate) -> BloodBankResult<InventoryBatch> {
        let mut batch = self.get_batch(id)?;

        if let Some(blood_group) = update.blood_group {
            batch.blood_group = blood_group;
        }
        if let Some(quantity) = update.quantity {
            batch.quantity = positive_units(quantity, "quantity")?;
        }
        if let Some(expiry_date) = update.expiry_date {
            batch.expiry_date = expiry_date;
        }
        if let Some(min_quantity) = update.min_quantity {
            batch.min_quantity = non_negative(min_quantity, "minQuantity")?;
        }
        batch.updated_at = Utc::now();

        self.db.update_batch(&batch)?;
        Ok(batch)
    }

    pub fn delete_batch(&self, id: &str) -> BloodBankResult<()> {
        if !self.db.delete_batch(id)? {
            return Err(BloodBankError::NotFound(format!("batch {}", id)));
        }
        Ok(())
    }

    /// Usable units of one group at a hospital.
    pub fn available_units(&self, hospital_id: &str, blood_group: BloodGroup) -> BloodBankResult<u32> {
        Ok(self.db.available_units(hospital_id, blood_group, Utc::now())?)
    }

    pub fn stock_summary(&self, hospital_id: &str) -> BloodBankResult<Vec<StockLevel>> {
        Ok(self.db.stock_levels(hospital_id, Utc::now())?)
    }

    pub fn low_stock(&self, hospital_id: &str) -> BloodBankResult<Vec<LowStockAlert>> {
        Ok(self.db.low_stock(hospital_id, Utc::now())?)
    }
}

/// Run a FIFO deduction against an open store.
///
/// Plans first, so a shortfall leaves every batch untouched. Callers wrap
/// this in a unit of work.
pub(crate) fn deduct_in<S: Store + ?Sized>(
    store: &S,
    hospital_id: &str,
    blood_group: BloodGroup,
    units: u32,
    now: DateTime<Utc>,
) -> BloodBankResult<Deduction> {
    let batches = store.fifo_batches(hospital_id, blood_group, now)?;
    let plan = plan_fifo(&batches, units).map_err(|shortfall| {
        debug!(
            hospital_id,
            blood_group = %blood_group,
            available = shortfall.available,
            required = shortfall.required,
            "insufficient stock"
        );
        BloodBankError::InsufficientStock {
            available: shortfall.available,
            required: shortfall.required,
        }
    })?;

    for action in &plan {
        match action {
            BatchAction::Consume { batch_id, .. } => {
                store.delete_batch(batch_id)?;
            }
            BatchAction::Reduce { batch_id, left, .. } => {
                store.set_batch_quantity(batch_id, *left)?;
            }
        }
    }

    let available: u64 = batches.iter().map(|b| u64::from(b.quantity)).sum();
    let remaining = u32::try_from(available - u64::from(units)).unwrap_or(u32::MAX);
    Ok(Deduction {
        blood_group,
        deducted: units,
        remaining,
    })
}

fn non_negative(value: i64, field: &str) -> BloodBankResult<u32> {
    u32::try_from(value).map_err(|_| {
        BloodBankError::Validation(format!("{} must be zero or more, got {}", field, value))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Hospital, NewHospital};
    use chrono::Duration;

    fn seeded() -> (Database, String) {
        let db = Database::open_in_memory().unwrap();
        let hospital = Hospital::new(NewHospital {
            name: "General".into(),
            address: "1 Main".into(),
            city: "Pune".into(),
            state: "MH".into(),
            pincode: None,
            contact: "555".into(),
            latitude: 18.5,
            longitude: 73.8,
        });
        db.insert_hospital(&hospital).unwrap();
        (db, hospital.id)
    }

    fn stock(db: &Database, hospital_id: &str, qty: u32, days: i64) -> InventoryBatch {
        let batch = InventoryBatch::new(
            hospital_id.to_string(),
            BloodGroup::APositive,
            qty,
            Utc::now() + Duration::days(days),
        );
        db.insert_batch(&batch).unwrap();
        batch
    }

    #[test]
    fn test_deduct_fifo() {
        let (db, h) = seeded();
        let first = stock(&db, &h, 5, 2);
        let second = stock(&db, &h, 3, 10);

        let ledger = InventoryLedger::new(&db);
        let deduction = ledger.deduct(&h, BloodGroup::APositive, 6).unwrap();

        assert_eq!(deduction.deducted, 6);
        assert_eq!(deduction.remaining, 2);
        assert!(db.get_batch(&first.id).unwrap().is_none());
        assert_eq!(db.get_batch(&second.id).unwrap().unwrap().quantity, 2);
    }

    #[test]
    fn test_deduct_insufficient_leaves_stock() {
        let (db, h) = seeded();
        stock(&db, &h, 5, 2);
        stock(&db, &h, 3, 10);

        let ledger = InventoryLedger::new(&db);
        let err = ledger.deduct(&h, BloodGroup::APositive, 100).unwrap_err();

        assert!(matches!(
            err,
            BloodBankError::InsufficientStock { available: 8, required: 100 }
        ));
        assert_eq!(ledger.available_units(&h, BloodGroup::APositive).unwrap(), 8);
    }

    #[test]
    fn test_deduct_rejects_non_positive_units() {
        let (db, h) = seeded();
        let ledger = InventoryLedger::new(&db);
        assert!(matches!(
            ledger.deduct(&h, BloodGroup::APositive, 0),
            Err(BloodBankError::Validation(_))
        ));
        assert!(matches!(
            ledger.deduct(&h, BloodGroup::APositive, -3),
            Err(BloodBankError::Validation(_))
        ));
    }

    #[test]
    fn test_deduct_twice_consumes_twice() {
        let (db, h) = seeded();
        stock(&db, &h, 10, 5);

        let ledger = InventoryLedger::new(&db);
        ledger.deduct(&h, BloodGroup::APositive, 4).unwrap();
        let second = ledger.deduct(&h, BloodGroup::APositive, 4).unwrap();
        assert_eq!(second.remaining, 2);
    }

    #[test]
    fn test_create_batch_validation() {
        let (db, h) = seeded();
        let ledger = InventoryLedger::new(&db);

        let form = |hospital_id: &str, quantity: i64| NewBatch {
            hospital_id: hospital_id.to_string(),
            blood_group: BloodGroup::ONegative,
            quantity,
            expiry_date: Utc::now() + Duration::days(30),
            donation_id: None,
            min_quantity: Some(2),
        };

        let batch = ledger.create_batch(form(&h, 4)).unwrap();
        assert_eq!(batch.min_quantity, 2);
        assert!(matches!(
            ledger.create_batch(form(&h, 0)),
            Err(BloodBankError::Validation(_))
        ));
        assert!(matches!(
            ledger.create_batch(form("nowhere", 4)),
            Err(BloodBankError::NotFound(_))
        ));
    }

    #[test]
    fn test_update_batch() {
        let (db, h) = seeded();
        let batch = stock(&db, &h, 5, 3);
        let ledger = InventoryLedger::new(&db);

        let updated = ledger
            .update_batch(
                &batch.id,
                BatchUpdate {
                    quantity: Some(9),
                    min_quantity: Some(3),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.quantity, 9);
        assert_eq!(db.get_batch(&batch.id).unwrap().unwrap().min_quantity, 3);

        let err = ledger
            .update_batch(&batch.id, BatchUpdate { quantity: Some(0), ..Default::default() })
            .unwrap_err();
        assert!(matches!(err, BloodBankError::Validation(_)));
        assert!(matches!(
            ledger.update_batch("missing", BatchUpdate::default()),
            Err(BloodBankError::NotFound(_))
        ));
    }

    #[test]
    fn test_delete_batch() {
        let (db, h) = seeded();
        let batch = stock(&db, &h, 5, 3);
        let ledger = InventoryLedger::new(&db);

        ledger.delete_batch(&batch.id).unwrap();
        assert!(matches!(
            ledger.delete_batch(&batch.id),
            Err(BloodBankError::NotFound(_))
        ));
    }
}
