//! Donation reconciler.
//!
//! Recording a donation touches three tables: the donation event itself,
//! the donor's eligibility and, for hospital donations, the inventory. All
//! three land in one unit of work.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::db::{Database, DonationRepo, InventoryRepo, Store, UserRepo};
use crate::models::{
    expiry_for_donation, BloodGroup, DonationEvent, DonationUpdate, InventoryBatch, NewDonation,
};
use crate::{positive_units, require, BloodBankError, BloodBankResult};

/// A recorded donation and where its units went.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DonationReceipt {
    #[serde(flatten)]
    pub donation: DonationEvent,
    /// Batch credited with the units; `None` for camp donations
    pub batch_id: Option<String>,
    /// True when the units were added to an existing batch
    pub merged: bool,
}

/// Records donations and keeps donors and stock in step with them.
pub struct DonationReconciler<'a> {
    db: &'a Database,
}

impl<'a> DonationReconciler<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Record a donation made at a hospital or a camp.
    ///
    /// Validation errors are reported as such; once the unit of work has
    /// started, any failure rolls everything back and is reported as
    /// [`BloodBankError::DonationFailed`].
    pub fn record_donation(&self, form: NewDonation) -> BloodBankResult<DonationReceipt> {
        require(&form.donor_id, "donorId")?;
        let units = positive_units(form.units_donated, "unitsDonated")?;

        let (hospital_id, camp_id) = match (form.hospital(), form.camp()) {
            (Some(hospital), None) => (Some(hospital.to_string()), None),
            (None, Some(camp)) => (None, Some(camp.to_string())),
            (Some(_), Some(_)) => {
                return Err(BloodBankError::Validation(
                    "a donation belongs to either a hospital or a camp, not both".into(),
                ))
            }
            (None, None) => {
                return Err(BloodBankError::Validation(
                    "either hospitalId or campId is required".into(),
                ))
            }
        };

        let donation = DonationEvent::new(form.donor_id, hospital_id, camp_id, form.date, units);

        let receipt = self
            .db
            .unit_of_work(|uow| credit_donation(uow, donation, form.blood_group, Utc::now()))
            .map_err(|e| {
                warn!(error = %e, "donation rolled back");
                BloodBankError::DonationFailed(e.to_string())
            })?;

        info!(
            donation_id = %receipt.donation.id,
            donor_id = %receipt.donation.donor_id,
            units,
            batch_id = ?receipt.batch_id,
            merged = receipt.merged,
            "recorded donation"
        );
        Ok(receipt)
    }

    pub fn get_donation(&self, id: &str) -> BloodBankResult<DonationEvent> {
        self.db
            .get_donation(id)?
            .ok_or_else(|| BloodBankError::NotFound(format!("donation {}", id)))
    }

    pub fn list_donations(&self) -> BloodBankResult<Vec<DonationEvent>> {
        Ok(self.db.list_donations()?)
    }

    pub fn list_for_donor(&self, donor_id: &str) -> BloodBankResult<Vec<DonationEvent>> {
        Ok(self.db.list_donations_by_donor(donor_id)?)
    }

    pub fn list_for_hospital(&self, hospital_id: &str) -> BloodBankResult<Vec<DonationEvent>> {
        Ok(self.db.list_donations_by_hospital(hospital_id)?)
    }

    pub fn list_for_camp(&self, camp_id: &str) -> BloodBankResult<Vec<DonationEvent>> {
        Ok(self.db.list_donations_by_camp(camp_id)?)
    }

    /// Correct the date or unit count of a donation. Donor and stock are
    /// left as they are.
    pub fn update_donation(&self, id: &str, update: DonationUpdate) -> BloodBankResult<DonationEvent> {
        let mut donation = self.get_donation(id)?;
        if let Some(date) = update.date {
            donation.date = date;
        }
        if let Some(units) = update.units_donated {
            donation.units_donated = positive_units(units, "unitsDonated")?;
        }
        self.db.update_donation(&donation)?;
        Ok(donation)
    }

    /// Remove a donation record. A batch it created keeps its units.
    pub fn delete_donation(&self, id: &str) -> BloodBankResult<()> {
        if !self.db.delete_donation(id)? {
            return Err(BloodBankError::NotFound(format!("donation {}", id)));
        }
        Ok(())
    }
}

/// The writes behind one donation.
fn credit_donation<S: Store + ?Sized>(
    store: &S,
    donation: DonationEvent,
    blood_group: BloodGroup,
    now: DateTime<Utc>,
) -> BloodBankResult<DonationReceipt> {
    store.insert_donation(&donation)?;
    store.mark_donated(&donation.donor_id, donation.date)?;

    let Some(hospital_id) = donation.hospital_id.as_deref() else {
        return Ok(DonationReceipt {
            donation,
            batch_id: None,
            merged: false,
        });
    };

    let mut batch = InventoryBatch::new(
        hospital_id.to_string(),
        blood_group,
        donation.units_donated,
        expiry_for_donation(donation.date),
    );
    batch.donation_id = Some(donation.id.clone());

    // Blood already past its shelf life never joins live stock
    let target = if batch.is_expired(now) {
        None
    } else {
        store.latest_live_batch(hospital_id, blood_group, now)?
    };

    let (batch_id, merged) = match target {
        Some(existing) => {
            store.merge_into_batch(&existing.id, batch.quantity, batch.expiry_date)?;
            (existing.id, true)
        }
        None => {
            store.insert_batch(&batch)?;
            (batch.id, false)
        }
    };

    Ok(DonationReceipt {
        donation,
        batch_id: Some(batch_id),
        merged,
    })
}
