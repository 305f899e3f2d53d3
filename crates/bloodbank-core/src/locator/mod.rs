//! Emergency locator: find the nearest hospitals that can cover a shortfall.

mod haversine;

pub use haversine::*;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::db::{Database, HospitalRepo};
use crate::models::{BloodGroup, Hospital};
use crate::{positive_units, require, BloodBankError, BloodBankResult};

/// A hospital together with its usable stock of the searched group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HospitalAvailability {
    #[serde(flatten)]
    pub hospital: Hospital,
    pub available_quantity: u32,
    /// Kilometres from the requesting hospital, two decimals
    pub distance: f64,
}

/// Result of an emergency search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmergencySearchResult {
    /// The requester can cover the need from its own stock
    pub has_enough: bool,
    /// Requester's own usable units
    pub current_quantity: u32,
    /// The requester itself, when `has_enough`
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub hospital: Option<HospitalAvailability>,
    pub nearest_hospital: Option<HospitalAvailability>,
    /// Every other hospital that can cover the need, nearest first
    pub all_available_hospitals: Vec<HospitalAvailability>,
    pub message: String,
}

/// Emergency search over all registered hospitals.
pub struct EmergencyLocator<'a> {
    db: &'a Database,
}

impl<'a> EmergencyLocator<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Check whether `hospital_id` can cover `units_required` of
    /// `blood_group`, and if not, rank the hospitals that can.
    ///
    /// Reads outside any unit of work, so figures may trail concurrent
    /// writes slightly.
    pub fn locate(
        &self,
        hospital_id: &str,
        blood_group: BloodGroup,
        units_required: i64,
    ) -> BloodBankResult<EmergencySearchResult> {
        require(hospital_id, "hospitalId")?;
        let units = positive_units(units_required, "unitsRequired")?;

        let stock = self.db.hospitals_with_stock(blood_group, Utc::now())?;
        let Some((requester, current_quantity)) =
            stock.iter().find(|(h, _)| h.id == hospital_id).cloned()
        else {
            return Err(BloodBankError::NotFound(format!("hospital {}", hospital_id)));
        };

        if current_quantity >= units {
            return Ok(EmergencySearchResult {
                has_enough: true,
                current_quantity,
                hospital: Some(HospitalAvailability {
                    hospital: requester,
                    available_quantity: current_quantity,
                    distance: 0.0,
                }),
                nearest_hospital: None,
                all_available_hospitals: Vec::new(),
                message: format!(
                    "Sufficient {} stock available at the requesting hospital",
                    blood_group
                ),
            });
        }

        let candidates = rank_candidates(&requester, stock, units);
        debug!(
            hospital_id,
            blood_group = %blood_group,
            units,
            candidates = candidates.len(),
            "emergency search"
        );

        let message = match candidates.first() {
            Some(nearest) => format!(
                "Nearest hospital with {} units of {} is {} ({} km away)",
                units, blood_group, nearest.hospital.name, nearest.distance
            ),
            None => format!(
                "No hospital currently has {} units of {} available",
                units, blood_group
            ),
        };

        Ok(EmergencySearchResult {
            has_enough: false,
            current_quantity,
            hospital: None,
            nearest_hospital: candidates.first().cloned(),
            all_available_hospitals: candidates,
            message,
        })
    }
}

/// Other hospitals holding at least `units`, nearest first. The sort is
/// stable, so equal distances keep registration order.
pub fn rank_candidates(
    requester: &Hospital,
    stock: Vec<(Hospital, u32)>,
    units: u32,
) -> Vec<HospitalAvailability> {
    let mut candidates: Vec<_> = stock
        .into_iter()
        .filter(|(h, qty)| h.id != requester.id && *qty >= units)
        .map(|(hospital, qty)| {
            let distance = round2(haversine_km(
                requester.latitude,
                requester.longitude,
                hospital.latitude,
                hospital.longitude,
            ));
            HospitalAvailability {
                hospital,
                available_quantity: qty,
                distance,
            }
        })
        .collect();
    candidates.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    candidates
}
