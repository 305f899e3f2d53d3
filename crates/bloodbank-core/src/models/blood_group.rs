//! ABO/Rh blood groups.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One of the eight ABO/Rh blood groups.
///
/// Serialized with its conventional label (`"A+"`, `"O-"`, ...), which is
/// also the form stored in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BloodGroup {
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
}

#[derive(Debug, Clone, Error, PartialEq)]
#[error("Unknown blood group: {0}")]
pub struct UnknownBloodGroup(pub String);

impl BloodGroup {
    pub const ALL: [BloodGroup; 8] = [
        BloodGroup::APositive,
        BloodGroup::ANegative,
        BloodGroup::BPositive,
        BloodGroup::BNegative,
        BloodGroup::AbPositive,
        BloodGroup::AbNegative,
        BloodGroup::OPositive,
        BloodGroup::ONegative,
    ];

    /// Conventional label, e.g. `"AB-"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            BloodGroup::APositive => "A+",
            BloodGroup::ANegative => "A-",
            BloodGroup::BPositive => "B+",
            BloodGroup::BNegative => "B-",
            BloodGroup::AbPositive => "AB+",
            BloodGroup::AbNegative => "AB-",
            BloodGroup::OPositive => "O+",
            BloodGroup::ONegative => "O-",
        }
    }
}

impl fmt::Display for BloodGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BloodGroup {
    type Err = UnknownBloodGroup;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim().to_uppercase();
        BloodGroup::ALL
            .into_iter()
            .find(|group| group.as_str() == label)
            .ok_or_else(|| UnknownBloodGroup(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_labels() {
        assert_eq!("A+".parse::<BloodGroup>().unwrap(), BloodGroup::APositive);
        assert_eq!("ab-".parse::<BloodGroup>().unwrap(), BloodGroup::AbNegative);
        assert_eq!(" O- ".parse::<BloodGroup>().unwrap(), BloodGroup::ONegative);
        assert!("C+".parse::<BloodGroup>().is_err());
        assert!("A".parse::<BloodGroup>().is_err());
    }

    #[test]
    fn test_serde_uses_labels() {
        let json = serde_json::to_string(&BloodGroup::BNegative).unwrap();
        assert_eq!(json, "\"B-\"");

        let parsed: BloodGroup = serde_json::from_str("\"AB+\"").unwrap();
        assert_eq!(parsed, BloodGroup::AbPositive);

        assert!(serde_json::from_str::<BloodGroup>("\"Z+\"").is_err());
    }

    #[test]
    fn test_display_round_trips_through_from_str() {
        for group in BloodGroup::ALL {
            assert_eq!(group.to_string().parse::<BloodGroup>().unwrap(), group);
        }
    }
}
