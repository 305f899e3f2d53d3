//! Blood request lifecycle: creation, fulfilment from stock, cancellation.

use chrono::Utc;
use tracing::info;

use crate::db::{Database, HospitalRepo, RequestRepo, UserRepo};
use crate::ledger::deduct_in;
use crate::models::{BloodRequest, NewRequest, RequestStatus};
use crate::{positive_units, require, BloodBankError, BloodBankResult};

/// Creates, fulfils and cancels blood requests.
pub struct RequestFulfiller<'a> {
    db: &'a Database,
}

impl<'a> RequestFulfiller<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Open a pending request for a known receiver.
    pub fn create_request(&self, form: NewRequest) -> BloodBankResult<BloodRequest> {
        require(&form.receiver_id, "receiverId")?;
        let units = positive_units(form.units_required, "unitsRequired")?;

        if self.db.get_user(&form.receiver_id)?.is_none() {
            return Err(BloodBankError::NotFound(format!("user {}", form.receiver_id)));
        }

        let request = BloodRequest::new(form, units);
        self.db.insert_request(&request)?;
        info!(
            request_id = %request.id,
            blood_group = %request.blood_group,
            units,
            emergency = request.is_emergency,
            "opened blood request"
        );
        Ok(request)
    }

    /// Fulfil a pending request from `hospital_id`'s stock.
    ///
    /// The deduction and the status change commit together; on a shortfall
    /// the request stays pending and no stock moves.
    pub fn fulfill(&self, request_id: &str, hospital_id: &str) -> BloodBankResult<BloodRequest> {
        require(hospital_id, "hospitalId")?;

        let request = self.db.unit_of_work(|uow| -> BloodBankResult<BloodRequest> {
            let mut request = uow
                .get_request(request_id)?
                .ok_or_else(|| BloodBankError::NotFound(format!("request {}", request_id)))?;
            if request.status != RequestStatus::Pending {
                return Err(BloodBankError::InvalidState(format!(
                    "request {} is {}, not PENDING",
                    request_id,
                    request.status.as_str()
                )));
            }
            if uow.get_hospital(hospital_id)?.is_none() {
                return Err(BloodBankError::NotFound(format!("hospital {}", hospital_id)));
            }

            let now = Utc::now();
            deduct_in(uow, hospital_id, request.blood_group, request.units_required, now)?;
            uow.close_request(request_id, RequestStatus::Fulfilled, Some(hospital_id), now)?;

            request.status = RequestStatus::Fulfilled;
            request.hospital_id = Some(hospital_id.to_string());
            request.updated_at = now;
            Ok(request)
        })?;

        info!(request_id, hospital_id, "fulfilled blood request");
        Ok(request)
    }

    /// Cancel a pending request.
    pub fn cancel(&self, request_id: &str) -> BloodBankResult<BloodRequest> {
        let request = self.db.unit_of_work(|uow| -> BloodBankResult<BloodRequest> {
            let mut request = uow
                .get_request(request_id)?
                .ok_or_else(|| BloodBankError::NotFound(format!("request {}", request_id)))?;
            let now = Utc::now();
            if !uow.close_request(request_id, RequestStatus::Cancelled, None, now)? {
                return Err(BloodBankError::InvalidState(format!(
                    "request {} is {}, not PENDING",
                    request_id,
                    request.status.as_str()
                )));
            }

            request.status = RequestStatus::Cancelled;
            request.updated_at = now;
            Ok(request)
        })?;

        info!(request_id, "cancelled blood request");
        Ok(request)
    }

    pub fn get_request(&self, id: &str) -> BloodBankResult<BloodRequest> {
        self.db
            .get_request(id)?
            .ok_or_else(|| BloodBankError::NotFound(format!("request {}", id)))
    }

    pub fn list_requests(&self) -> BloodBankResult<Vec<BloodRequest>> {
        Ok(self.db.list_requests()?)
    }

    pub fn list_for_hospital(&self, hospital_id: &str) -> BloodBankResult<Vec<BloodRequest>> {
        Ok(self.db.list_requests_for_hospital(hospital_id)?)
    }

    pub fn delete_request(&self, id: &str) -> BloodBankResult<()> {
        if !self.db.delete_request(id)? {
            return Err(BloodBankError::NotFound(format!("request {}", id)));
        }
        Ok(())
    }
}
