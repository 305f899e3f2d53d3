//! Donation event models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp;
use super::BloodGroup;

/// A recorded donation, linked to either a hospital or a camp.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DonationEvent {
    pub id: String,
    pub donor_id: String,
    pub hospital_id: Option<String>,
    pub camp_id: Option<String>,
    /// When the blood was drawn
    pub date: DateTime<Utc>,
    pub units_donated: u32,
    pub created_at: DateTime<Utc>,
}

/// A donation as submitted by a client.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewDonation {
    pub donor_id: String,
    #[serde(default)]
    pub hospital_id: Option<String>,
    #[serde(default)]
    pub camp_id: Option<String>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub date: DateTime<Utc>,
    pub units_donated: i64,
    pub blood_group: BloodGroup,
}

/// Administrative correction of a donation record.
///
/// Corrections never replay the eligibility or inventory side effects.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DonationUpdate {
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub date: Option<DateTime<Utc>>,
    pub units_donated: Option<i64>,
}

impl NewDonation {
    /// Hospital id, treating an empty string as absent.
    pub fn hospital(&self) -> Option<&str> {
        self.hospital_id.as_deref().filter(|id| !id.trim().is_empty())
    }

    /// Camp id, treating an empty string as absent.
    pub fn camp(&self) -> Option<&str> {
        self.camp_id.as_deref().filter(|id| !id.trim().is_empty())
    }
}

impl DonationEvent {
    pub fn new(
        donor_id: String,
        hospital_id: Option<String>,
        camp_id: Option<String>,
        date: DateTime<Utc>,
        units_donated: u32,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            donor_id,
            hospital_id,
            camp_id,
            date,
            units_donated,
            created_at: Utc::now(),
        }
    }
}
