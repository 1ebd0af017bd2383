//! Stop domain model.
//!
//! A stop is a named geographic point reusable across many routes. Edits are
//! not part of this core, so a stop is treated as immutable once stored.

use super::ModelValidationError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a stop.
pub type StopId = Uuid;

/// Geographic point of interest served by one or more routes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub id: StopId,
    pub name: String,
    /// Degrees, WGS84-style. Not range-checked.
    pub latitude: f64,
    /// Degrees, WGS84-style. Not range-checked.
    pub longitude: f64,
}

impl Stop {
    /// Creates a stop with a freshly generated id.
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            latitude,
            longitude,
        }
    }

    /// Checks write-path invariants.
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if self.id.is_nil() {
            return Err(ModelValidationError::NilId("stop.id"));
        }
        if self.name.trim().is_empty() {
            return Err(ModelValidationError::BlankField("stop.name"));
        }
        for (field, value) in [
            ("stop.latitude", self.latitude),
            ("stop.longitude", self.longitude),
        ] {
            if !value.is_finite() {
                return Err(ModelValidationError::NonFiniteCoordinate { field, value });
            }
        }
        Ok(())
    }

    /// Squared straight-line distance in the (latitude, longitude) plane.
    ///
    /// No projection correction and no square root: only used to compare
    /// candidates against each other.
    pub fn squared_distance_to(&self, other: &Stop) -> f64 {
        let d_lat = self.latitude - other.latitude;
        let d_lon = self.longitude - other.longitude;
        d_lat * d_lat + d_lon * d_lon
    }
}
