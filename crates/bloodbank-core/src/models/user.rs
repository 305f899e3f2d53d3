//! Donor, patient and staff records.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp;
use super::BloodGroup;

/// Role a person plays towards the blood bank.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserType {
    #[default]
    Donor,
    Patient,
    Staff,
}

/// A donor, patient or staff member, optionally attached to a hospital.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub contact: Option<String>,
    pub email: Option<String>,
    pub blood_group: BloodGroup,
    pub user_type: UserType,
    /// Date of the most recent recorded donation
    pub last_donation: Option<DateTime<Utc>>,
    /// Cleared on every donation; nothing here sets it back automatically
    pub is_eligible: bool,
    /// Body weight in kg
    pub weight: Option<f64>,
    /// g/dL
    pub hemoglobin: Option<f64>,
    pub hospital_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Minimal projection used for pick lists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub contact: Option<String>,
    pub blood_group: BloodGroup,
}

/// Registration form for a user.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewUser {
    pub name: String,
    pub blood_group: BloodGroup,
    #[serde(default)]
    pub user_type: UserType,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub last_donation: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_eligible: Option<bool>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub hemoglobin: Option<f64>,
    #[serde(default)]
    pub hospital_id: Option<String>,
}

/// Fields an administrator may change on a user.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub blood_group: Option<BloodGroup>,
    pub user_type: Option<UserType>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub contact: Option<String>,
    pub email: Option<String>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub last_donation: Option<DateTime<Utc>>,
    pub is_eligible: Option<bool>,
    pub weight: Option<f64>,
    pub hemoglobin: Option<f64>,
    pub hospital_id: Option<String>,
}

/// Search criteria; each set field is a substring match, any match wins.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    pub name: Option<String>,
    pub contact: Option<String>,
    pub email: Option<String>,
}

impl User {
    /// Build a user record from a registration form.
    pub fn new(form: NewUser) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: form.name,
            date_of_birth: form.date_of_birth,
            gender: form.gender,
            contact: form.contact,
            email: form.email,
            blood_group: form.blood_group,
            user_type: form.user_type,
            last_donation: form.last_donation,
            is_eligible: form.is_eligible.unwrap_or(true),
            weight: form.weight,
            hemoglobin: form.hemoglobin,
            hospital_id: form.hospital_id.filter(|id| !id.is_empty()),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            contact: self.contact.clone(),
            blood_group: self.blood_group,
        }
    }
}

impl UserUpdate {
    /// Merge the set fields into `user`.
    pub fn apply(self, user: &mut User) {
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(blood_group) = self.blood_group {
            user.blood_group = blood_group;
        }
        if let Some(user_type) = self.user_type {
            user.user_type = user_type;
        }
        if self.date_of_birth.is_some() {
            user.date_of_birth = self.date_of_birth;
        }
        if self.gender.is_some() {
            user.gender = self.gender;
        }
        if self.contact.is_some() {
            user.contact = self.contact;
        }
        if self.email.is_some() {
            user.email = self.email;
        }
        if self.last_donation.is_some() {
            user.last_donation = self.last_donation;
        }
        if let Some(is_eligible) = self.is_eligible {
            user.is_eligible = is_eligible;
        }
        if self.weight.is_some() {
            user.weight = self.weight;
        }
        if self.hemoglobin.is_some() {
            user.hemoglobin = self.hemoglobin;
        }
        if let Some(hospital_id) = self.hospital_id {
            user.hospital_id = Some(hospital_id).filter(|id| !id.is_empty());
        }
        user.updated_at = Utc::now();
    }
}

impl UserQuery {
    pub fn is_empty(&self) -> bool {
        [&self.name, &self.contact, &self.email]
            .iter()
            .all(|field| field.as_deref().map_or(true, str::is_empty))
    }
}
