//! Directory of hospitals, users and camps.

use tracing::info;

use crate::db::{CampRepo, Database, DonationRepo, HospitalRepo, UserRepo};
use crate::models::{
    validate_coordinates, Camp, CampUpdate, DonationEvent, Hospital, HospitalUpdate, NewCamp,
    NewHospital, NewUser, User, UserQuery, UserSummary, UserUpdate,
};
use crate::{require, BloodBankError, BloodBankResult};

/// Registration and upkeep of the records the ledger hangs off.
pub struct Directory<'a> {
    db: &'a Database,
}

impl<'a> Directory<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    // =====================================================================
    // Hospitals
    // =====================================================================

    pub fn register_hospital(&self, form: NewHospital) -> BloodBankResult<Hospital> {
        let hospital = Hospital::new(form);
        validate_hospital(&hospital)?;
        self.db.insert_hospital(&hospital)?;
        info!(hospital_id = %hospital.id, name = %hospital.name, "registered hospital");
        Ok(hospital)
    }

    pub fn get_hospital(&self, id: &str) -> BloodBankResult<Hospital> {
        self.db
            .get_hospital(id)?
            .ok_or_else(|| BloodBankError::NotFound(format!("hospital {}", id)))
    }

    pub fn list_hospitals(&self) -> BloodBankResult<Vec<Hospital>> {
        Ok(self.db.list_hospitals()?)
    }

    /// Users attached to a hospital.
    pub fn hospital_users(&self, id: &str) -> BloodBankResult<Vec<User>> {
        self.get_hospital(id)?;
        Ok(self.db.list_users_for_hospital(id)?)
    }

    pub fn update_hospital(&self, id: &str, update: HospitalUpdate) -> BloodBankResult<Hospital> {
        let mut hospital = self.get_hospital(id)?;
        update.apply(&mut hospital);
        validate_hospital(&hospital)?;
        self.db.update_hospital(&hospital)?;
        Ok(hospital)
    }

    /// Remove a hospital and its inventory.
    pub fn delete_hospital(&self, id: &str) -> BloodBankResult<()> {
        if !self.db.delete_hospital(id)? {
            return Err(BloodBankError::NotFound(format!("hospital {}", id)));
        }
        info!(hospital_id = id, "deleted hospital");
        Ok(())
    }

    // =====================================================================
    // Users
    // =====================================================================

    pub fn register_user(&self, form: NewUser) -> BloodBankResult<User> {
        let user = User::new(form);
        self.validate_user(&user)?;
        self.db.insert_user(&user)?;
        info!(user_id = %user.id, user_type = ?user.user_type, "registered user");
        Ok(user)
    }

    pub fn get_user(&self, id: &str) -> BloodBankResult<User> {
        self.db
            .get_user(id)?
            .ok_or_else(|| BloodBankError::NotFound(format!("user {}", id)))
    }

    pub fn list_users(&self) -> BloodBankResult<Vec<User>> {
        Ok(self.db.list_users()?)
    }

    /// Pick-list projection, optionally limited to one hospital.
    pub fn user_summaries(&self, hospital_id: Option<&str>) -> BloodBankResult<Vec<UserSummary>> {
        let hospital_id = hospital_id.filter(|id| !id.trim().is_empty());
        Ok(self.db.list_user_summaries(hospital_id)?)
    }

    /// Substring search; an empty query finds nobody.
    pub fn search_users(&self, query: &UserQuery) -> BloodBankResult<Vec<User>> {
        if query.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.db.search_users(query)?)
    }

    pub fn update_user(&self, id: &str, update: UserUpdate) -> BloodBankResult<User> {
        let mut user = self.get_user(id)?;
        update.apply(&mut user);
        self.validate_user(&user)?;
        self.db.update_user(&user)?;
        Ok(user)
    }

    pub fn delete_user(&self, id: &str) -> BloodBankResult<()> {
        if !self.db.delete_user(id)? {
            return Err(BloodBankError::NotFound(format!("user {}", id)));
        }
        Ok(())
    }

    fn validate_user(&self, user: &User) -> BloodBankResult<()> {
        require(&user.name, "name")?;
        if let Some(hospital_id) = user.hospital_id.as_deref() {
            if self.db.get_hospital(hospital_id)?.is_none() {
                return Err(BloodBankError::Validation(format!(
                    "unknown hospital {}",
                    hospital_id
                )));
            }
        }
        Ok(())
    }

    // =====================================================================
    // Camps
    // =====================================================================

    pub fn create_camp(&self, form: NewCamp) -> BloodBankResult<Camp> {
        let camp = Camp::new(form);
        validate_camp(&camp)?;
        self.db.insert_camp(&camp)?;
        info!(camp_id = %camp.id, name = %camp.name, "created camp");
        Ok(camp)
    }

    pub fn get_camp(&self, id: &str) -> BloodBankResult<Camp> {
        self.db
            .get_camp(id)?
            .ok_or_else(|| BloodBankError::NotFound(format!("camp {}", id)))
    }

    pub fn list_camps(&self) -> BloodBankResult<Vec<Camp>> {
        Ok(self.db.list_camps()?)
    }

    /// Donations collected at a camp.
    pub fn camp_donations(&self, id: &str) -> BloodBankResult<Vec<DonationEvent>> {
        self.get_camp(id)?;
        Ok(self.db.list_donations_by_camp(id)?)
    }

    pub fn update_camp(&self, id: &str, update: CampUpdate) -> BloodBankResult<Camp> {
        let mut camp = self.get_camp(id)?;
        update.apply(&mut camp);
        validate_camp(&camp)?;
        self.db.update_camp(&camp)?;
        Ok(camp)
    }

    pub fn delete_camp(&self, id: &str) -> BloodBankResult<()> {
        if !self.db.delete_camp(id)? {
            return Err(BloodBankError::NotFound(format!("camp {}", id)));
        }
        Ok(())
    }
}

fn validate_hospital(hospital: &Hospital) -> BloodBankResult<()> {
    require(&hospital.name, "name")?;
    require(&hospital.address, "address")?;
    require(&hospital.city, "city")?;
    require(&hospital.state, "state")?;
    require(&hospital.contact, "contact")?;
    validate_coordinates(hospital.latitude, hospital.longitude).map_err(BloodBankError::Validation)
}

fn validate_camp(camp: &Camp) -> BloodBankResult<()> {
    require(&camp.name, "name")?;
    require(&camp.location, "location")?;
    if let (Some(lat), Some(lon)) = (camp.latitude, camp.longitude) {
        validate_coordinates(lat, lon).map_err(BloodBankError::Validation)?;
    }
    if !camp.has_valid_window() {
        return Err(BloodBankError::Validation(
            "endDate must not be before startDate".into(),
        ));
    }
    Ok(())
}
