use serde::Deserialize;
use validator::Validate;

use super::parkrun_id::ParkrunId;

/// An athlete whose results should be fetched, as listed in the athlete
/// configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct AthleteConfig {
    /// Expected display name; checked against the name on the results page.
    #[validate(length(min = 1, message = "Athlete name must not be empty"))]
    pub name: String,

    // Headers are lower-cased before deserializing.
    #[serde(rename = "parkrunid", alias = "parkrun_id", alias = "parkrun id")]
    #[validate(custom(function = "validate_parkrun_id"))]
    pub parkrun_id: String,
}

impl AthleteConfig {
    pub fn new(name: impl Into<String>, parkrun_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parkrun_id: parkrun_id.into(),
        }
    }

    pub fn athlete_id(&self) -> ParkrunId {
        ParkrunId::new(&self.parkrun_id)
    }
}

fn validate_parkrun_id(parkrun_id: &str) -> Result<(), validator::ValidationError> {
    if ParkrunId::new(parkrun_id).is_valid() {
        Ok(())
    } else {
        Err(validator::ValidationError::new("invalid_parkrun_id"))
    }
}
