//! Blood request models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::BloodGroup;

/// Blood request lifecycle.
///
/// `Pending` moves to `Fulfilled` (through fulfilment only) or to
/// `Cancelled`; both are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Pending,
    Fulfilled,
    Cancelled,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "PENDING",
            RequestStatus::Fulfilled => "FULFILLED",
            RequestStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(RequestStatus::Pending),
            "FULFILLED" => Some(RequestStatus::Fulfilled),
            "CANCELLED" => Some(RequestStatus::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }
}

/// A request for blood on behalf of a receiver.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BloodRequest {
    pub id: String,
    pub receiver_id: String,
    /// Requesting hospital; replaced by the fulfilling hospital on fulfilment
    pub hospital_id: Option<String>,
    pub blood_group: BloodGroup,
    pub units_required: u32,
    pub is_emergency: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewRequest {
    pub receiver_id: String,
    #[serde(default)]
    pub hospital_id: Option<String>,
    pub blood_group: BloodGroup,
    pub units_required: i64,
    #[serde(default)]
    pub is_emergency: bool,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl BloodRequest {
    /// New pending request. `units_required` must already be validated.
    pub fn new(form: NewRequest, units_required: u32) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            receiver_id: form.receiver_id,
            hospital_id: form.hospital_id.filter(|id| !id.is_empty()),
            blood_group: form.blood_group,
            units_required,
            is_emergency: form.is_emergency,
            latitude: form.latitude,
            longitude: form.longitude,
            status: RequestStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_strings() {
        for status in [
            RequestStatus::Pending,
            RequestStatus::Fulfilled,
            RequestStatus::Cancelled,
        ] {
            assert_eq!(RequestStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(RequestStatus::from_str("pending"), None);
    }

    #[test]
    fn test_terminal_states() {
        assert!(!RequestStatus::Pending.is_terminal());
        assert!(RequestStatus::Fulfilled.is_terminal());
        assert!(RequestStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_new_request_is_pending() {
        let form: NewRequest = serde_json::from_str(
            r#"{"receiverId":"u-1","bloodGroup":"B+","unitsRequired":2,"isEmergency":true}"#,
        )
        .unwrap();
        let request = BloodRequest::new(form, 2);
        assert_eq!(request.status, RequestStatus::Pending);
        assert!(request.is_emergency);
        assert!(request.hospital_id.is_none());
    }
}
