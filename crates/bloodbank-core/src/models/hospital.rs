//! Hospital models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered hospital: inventory owner and emergency-search target.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Hospital {
    /// UUID
    pub id: String,
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub pincode: Option<String>,
    /// Degrees, [-90, 90]
    pub latitude: f64,
    /// Degrees, [-180, 180]
    pub longitude: f64,
    /// Phone number or other contact line
    pub contact: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Registration form for a hospital.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewHospital {
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    #[serde(default)]
    pub pincode: Option<String>,
    pub contact: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Fields a hospital may change after registration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HospitalUpdate {
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub contact: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Hospital {
    /// Build a hospital record from a registration form.
    pub fn new(form: NewHospital) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: form.name,
            address: form.address,
            city: form.city,
            state: form.state,
            pincode: form.pincode,
            latitude: form.latitude,
            longitude: form.longitude,
            contact: form.contact,
            created_at: now,
            updated_at: now,
        }
    }
}

impl HospitalUpdate {
    /// Merge the set fields into `hospital`.
    pub fn apply(self, hospital: &mut Hospital) {
        if let Some(name) = self.name {
            hospital.name = name;
        }
        if let Some(address) = self.address {
            hospital.address = address;
        }
        if let Some(city) = self.city {
            hospital.city = city;
        }
        if let Some(state) = self.state {
            hospital.state = state;
        }
        if let Some(pincode) = self.pincode {
            hospital.pincode = Some(pincode);
        }
        if let Some(contact) = self.contact {
            hospital.contact = contact;
        }
        if let Some(latitude) = self.latitude {
            hospital.latitude = latitude;
        }
        if let Some(longitude) = self.longitude {
            hospital.longitude = longitude;
        }
        hospital.updated_at = Utc::now();
    }
}

/// Check that a coordinate pair lies on the globe.
pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), String> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(format!("latitude out of range: {}", latitude));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(format!("longitude out of range: {}", longitude));
    }
    Ok(())
}
