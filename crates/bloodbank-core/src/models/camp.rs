//! Donation camp models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp;

/// A time-boxed donation drive held outside a hospital.
///
/// Donations collected at a camp are recorded against the donor but do not
/// credit any hospital inventory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Camp {
    pub id: String,
    pub name: String,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub organizer: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewCamp {
    pub name: String,
    pub location: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub start_date: DateTime<Utc>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub organizer: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CampUpdate {
    pub name: Option<String>,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub end_date: Option<DateTime<Utc>>,
    pub organizer: Option<String>,
}

impl Camp {
    pub fn new(form: NewCamp) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: form.name,
            location: form.location,
            latitude: form.latitude,
            longitude: form.longitude,
            start_date: form.start_date,
            end_date: form.end_date,
            organizer: form.organizer,
            created_at: now,
            updated_at: now,
        }
    }

    /// A camp must not end before it starts.
    pub fn has_valid_window(&self) -> bool {
        self.end_date >= self.start_date
    }
}

impl CampUpdate {
    pub fn apply(self, camp: &mut Camp) {
        if let Some(name) = self.name {
            camp.name = name;
        }
        if let Some(location) = self.location {
            camp.location = location;
        }
        if self.latitude.is_some() {
            camp.latitude = self.latitude;
        }
        if self.longitude.is_some() {
            camp.longitude = self.longitude;
        }
        if let Some(start_date) = self.start_date {
            camp.start_date = start_date;
        }
        if let Some(end_date) = self.end_date {
            camp.end_date = end_date;
        }
        if self.organizer.is_some() {
            camp.organizer = self.organizer;
        }
        camp.updated_at = Utc::now();
    }
}
