//! Geographic value types and the great-circle distance evaluator.
//!
//! Check-ins are geofenced: a user may only check into a hotspot when the
//! reported device position lies within [`GEOFENCE_RADIUS_M`] of the
//! hotspot's coordinates.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Mean Earth radius in kilometres used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Radius around a hotspot within which check-in is permitted, in metres.
pub const GEOFENCE_RADIUS_M: f64 = 100.0;

/// Validation errors returned by [`Coordinates::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CoordinatesValidationError {
    /// Latitude or longitude is NaN or infinite.
    #[error("coordinates must be finite numbers")]
    NotFinite,
    /// Latitude falls outside [-90, 90] degrees.
    #[error("latitude must be between -90 and 90 degrees")]
    LatitudeOutOfRange,
    /// Longitude falls outside [-180, 180] degrees.
    #[error("longitude must be between -180 and 180 degrees")]
    LongitudeOutOfRange,
}

/// A validated WGS84 position in decimal degrees.
///
/// ## Invariants
/// - Both components are finite.
/// - Latitude lies in [-90, 90], longitude in [-180, 180].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[serde(try_from = "CoordinatesDto", into = "CoordinatesDto")]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    /// Validate and construct a position.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinatesValidationError> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(CoordinatesValidationError::NotFinite);
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinatesValidationError::LatitudeOutOfRange);
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinatesValidationError::LongitudeOutOfRange);
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Latitude in decimal degrees.
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in decimal degrees.
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Great-circle distance to `other` in kilometres (haversine).
    pub fn distance_km(&self, other: &Self) -> f64 {
        let lat_a = self.latitude.to_radians();
        let lat_b = other.latitude.to_radians();
        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lng = (other.longitude - self.longitude).to_radians();

        let h = (d_lat / 2.0).sin().powi(2)
            + lat_a.cos() * lat_b.cos() * (d_lng / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
    }

    /// Great-circle distance to `other` in metres.
    pub fn distance_m(&self, other: &Self) -> f64 {
        self.distance_km(other) * 1000.0
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct CoordinatesDto {
    latitude: f64,
    longitude: f64,
}

impl From<Coordinates> for CoordinatesDto {
    fn from(value: Coordinates) -> Self {
        Self {
            latitude: value.latitude,
            longitude: value.longitude,
        }
    }
}

impl TryFrom<CoordinatesDto> for Coordinates {
    type Error = CoordinatesValidationError;

    fn try_from(value: CoordinatesDto) -> Result<Self, Self::Error> {
        Coordinates::new(value.latitude, value.longitude)
    }
}
