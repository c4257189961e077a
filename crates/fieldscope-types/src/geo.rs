//! The canonical geographic coordinate type.
//!
//! The source map stack passed coordinates around as `[lat, lon]` arrays,
//! `{lat, lng}` objects, and `{lat, lon}` objects interchangeably. Here a
//! single [`Coordinate`] type sits at the core boundary; adapters convert
//! into and out of it at the edge, never inside the core. Construction goes
//! through a validating factory -- an out-of-range or non-finite pair is
//! rejected before it can reach any provider call.

use serde::{Deserialize, Serialize};

/// Default map center used before the user selects anywhere (central India).
pub const DEFAULT_CENTER: Coordinate = Coordinate {
    lat: 20.5937,
    lon: 78.9629,
};

/// Errors produced by the [`Coordinate`] factory.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoordinateError {
    /// Latitude outside the [-90, 90] degree range.
    #[error("latitude {value} outside [-90, 90]")]
    LatitudeOutOfRange {
        /// The rejected latitude.
        value: f64,
    },

    /// Longitude outside the [-180, 180] degree range.
    #[error("longitude {value} outside [-180, 180]")]
    LongitudeOutOfRange {
        /// The rejected longitude.
        value: f64,
    },

    /// A component was NaN or infinite.
    #[error("coordinate components must be finite (got lat={lat}, lon={lon})")]
    NotFinite {
        /// The offered latitude.
        lat: f64,
        /// The offered longitude.
        lon: f64,
    },
}

/// A validated latitude/longitude pair in decimal degrees.
///
/// Invariant: `lat` is in [-90, 90] and `lon` is in [-180, 180], both
/// finite. The fields are private so the invariant holds for every value
/// of this type, including deserialized ones (deserialization is routed
/// through the factory via `try_from`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    /// Latitude in decimal degrees.
    lat: f64,
    /// Longitude in decimal degrees.
    lon: f64,
}

/// Unvalidated wire shape for [`Coordinate`] deserialization.
#[derive(Debug, Deserialize)]
struct RawCoordinate {
    lat: f64,
    lon: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = CoordinateError;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Self::new(raw.lat, raw.lon)
    }
}

impl Coordinate {
    /// Validating factory: the only way to obtain a `Coordinate`.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinateError`] if either component is non-finite or
    /// outside its range.
    pub fn new(lat: f64, lon: f64) -> Result<Self, CoordinateError> {
        if !lat.is_finite() || !lon.is_finite() {
            return Err(CoordinateError::NotFinite { lat, lon });
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(CoordinateError::LatitudeOutOfRange { value: lat });
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(CoordinateError::LongitudeOutOfRange { value: lon });
        }
        Ok(Self { lat, lon })
    }

    /// Latitude in decimal degrees, guaranteed within [-90, 90].
    pub const fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in decimal degrees, guaranteed within [-180, 180].
    pub const fn lon(&self) -> f64 {
        self.lon
    }
}

impl core::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lon)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn accepts_in_range_pairs() {
        let c = Coordinate::new(20.5937, 78.9629).unwrap();
        assert!((c.lat() - 20.5937).abs() < f64::EPSILON);
        assert!((c.lon() - 78.9629).abs() < f64::EPSILON);
    }

    #[test]
    fn accepts_boundary_values() {
        assert!(Coordinate::new(90.0, 180.0).is_ok());
        assert!(Coordinate::new(-90.0, -180.0).is_ok());
        assert!(Coordinate::new(0.0, 0.0).is_ok());
    }

    #[test]
    fn rejects_out_of_range_latitude() {
        let err = Coordinate::new(91.0, 0.0).unwrap_err();
        assert!(matches!(err, CoordinateError::LatitudeOutOfRange { .. }));
    }

    #[test]
    fn rejects_out_of_range_longitude() {
        let err = Coordinate::new(0.0, -180.5).unwrap_err();
        assert!(matches!(err, CoordinateError::LongitudeOutOfRange { .. }));
    }

    #[test]
    fn rejects_non_finite_components() {
        assert!(matches!(
            Coordinate::new(f64::NAN, 0.0),
            Err(CoordinateError::NotFinite { .. })
        ));
        assert!(matches!(
            Coordinate::new(0.0, f64::INFINITY),
            Err(CoordinateError::NotFinite { .. })
        ));
    }

    #[test]
    fn deserialization_goes_through_the_factory() {
        let ok: Result<Coordinate, _> = serde_json::from_str(r#"{"lat": 12.97, "lon": 77.59}"#);
        assert!(ok.is_ok());

        let bad: Result<Coordinate, _> = serde_json::from_str(r#"{"lat": 120.0, "lon": 0.0}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn display_uses_four_decimal_places() {
        let c = Coordinate::new(12.971601, 77.594584).unwrap();
        assert_eq!(c.to_string(), "12.9716, 77.5946");
    }
}
