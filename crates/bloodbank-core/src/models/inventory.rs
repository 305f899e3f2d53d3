//! Blood inventory batch models.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp;
use super::BloodGroup;

/// Validity window applied to donated blood.
pub const SHELF_LIFE_DAYS: i64 = 42;

/// A discrete quantity of one blood group with a single expiry date.
///
/// A stored batch always holds at least one unit; a batch that would drop
/// to zero is deleted instead.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InventoryBatch {
    pub id: String,
    pub hospital_id: String,
    pub blood_group: BloodGroup,
    pub quantity: u32,
    pub expiry_date: DateTime<Utc>,
    /// Donation that created this batch, if any
    pub donation_id: Option<String>,
    /// Reorder threshold for the batch's blood group
    pub min_quantity: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A batch as submitted for manual stock entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewBatch {
    pub hospital_id: String,
    pub blood_group: BloodGroup,
    pub quantity: i64,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub expiry_date: DateTime<Utc>,
    #[serde(default)]
    pub donation_id: Option<String>,
    #[serde(default)]
    pub min_quantity: Option<i64>,
}

/// Fields that may be corrected on a stored batch.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BatchUpdate {
    pub blood_group: Option<BloodGroup>,
    pub quantity: Option<i64>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub expiry_date: Option<DateTime<Utc>>,
    pub min_quantity: Option<i64>,
}

/// Stock position of one blood group at one hospital.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StockLevel {
    pub blood_group: BloodGroup,
    /// Units in batches that have not expired
    pub available: u32,
    /// Expired units still on the books
    pub expired: u32,
    pub batch_count: u32,
    /// Earliest expiry among usable batches
    pub earliest_expiry: Option<DateTime<Utc>>,
}

/// A blood group whose usable stock has fallen to its reorder threshold.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LowStockAlert {
    pub hospital_id: String,
    pub blood_group: BloodGroup,
    pub available: u32,
    /// Largest `min_quantity` across the group's batches
    pub threshold: u32,
}

impl InventoryBatch {
    pub fn new(
        hospital_id: String,
        blood_group: BloodGroup,
        quantity: u32,
        expiry_date: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            hospital_id,
            blood_group,
            quantity,
            expiry_date,
            donation_id: None,
            min_quantity: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Usable stock is strictly before its expiry instant.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry_date <= now
    }
}

/// Expiry of blood drawn at `drawn_at`.
pub fn expiry_for_donation(drawn_at: DateTime<Utc>) -> DateTime<Utc> {
    drawn_at + Duration::days(SHELF_LIFE_DAYS)
}
